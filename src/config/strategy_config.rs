use crate::indicators::range_filter::{NanPolicy, RangeSource};
use crate::strategy::range_filter::ExitPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Parameters for {found} given to a {expected} strategy")]
    ParamsMismatch {
        expected: StrategyType,
        found: StrategyType,
    },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

//strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    RangeFilter,
    Ict,
    OptimizedIct,
    TwoBullishCandles,
}

impl StrategyType {
    //parse strategy type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "range_filter" | "rangefilter" | "rf" => Some(StrategyType::RangeFilter),
            "ict" => Some(StrategyType::Ict),
            "optimized_ict" | "ict_optimized" => Some(StrategyType::OptimizedIct),
            "two_bullish" | "two_bullish_candles" => Some(StrategyType::TwoBullishCandles),
            _ => None,
        }
    }

    //default parameters for this strategy
    pub fn default_params(self) -> StrategyParams {
        match self {
            StrategyType::RangeFilter => StrategyParams::RangeFilter(RangeFilterParams::default()),
            StrategyType::Ict => StrategyParams::Ict(IctParams::default()),
            StrategyType::OptimizedIct => {
                StrategyParams::OptimizedIct(OptimizedIctParams::default())
            }
            StrategyType::TwoBullishCandles => {
                StrategyParams::TwoBullishCandles(TwoBullishCandlesParams::default())
            }
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyType::RangeFilter => "range_filter",
            StrategyType::Ict => "ict",
            StrategyType::OptimizedIct => "optimized_ict",
            StrategyType::TwoBullishCandles => "two_bullish_candles",
        };
        write!(f, "{name}")
    }
}

//range filter strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFilterParams {
    //smoothing period, also the filter warm-up count
    pub period: usize,
    //multiplier applied to the smoothed range
    pub qty: f64,
    pub source: RangeSource,
    pub nan_policy: NanPolicy,
    pub exit_policy: ExitPolicy,
    pub enter_long_tag: String,
    pub enter_short_tag: String,
    pub exit_long_tag: String,
    pub exit_short_tag: String,
}

impl Default for RangeFilterParams {
    fn default() -> Self {
        RangeFilterParams {
            period: 55,
            qty: 4.5,
            source: RangeSource::TrueRange,
            nan_policy: NanPolicy::Hold,
            exit_policy: ExitPolicy::Unconditional,
            enter_long_tag: "range_filter_long".to_string(),
            enter_short_tag: "range_filter_short".to_string(),
            exit_long_tag: "range_filter_exit_long".to_string(),
            exit_short_tag: "range_filter_exit_short".to_string(),
        }
    }
}

impl RangeFilterParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(invalid("period", "must be at least 1"));
        }
        if !(self.qty > 0.0 && self.qty.is_finite()) {
            return Err(invalid("qty", format!("must be positive, got {}", self.qty)));
        }
        Ok(())
    }
}

//ict order block strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IctParams {
    pub ema_period: usize,
    pub order_block_window: usize,
}

impl Default for IctParams {
    fn default() -> Self {
        IctParams {
            ema_period: 200,
            order_block_window: 3,
        }
    }
}

impl IctParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ema_period == 0 {
            return Err(invalid("ema_period", "must be at least 1"));
        }
        if self.order_block_window == 0 {
            return Err(invalid("order_block_window", "must be at least 1"));
        }
        Ok(())
    }
}

//optimized ict strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizedIctParams {
    pub ema_period: usize,
    pub atr_period: usize,
    //atr_stop = atr * atr_multiplier
    pub atr_multiplier: f64,
    pub rsi_period: usize,
    //long entries need rsi below this
    pub rsi_long_below: f64,
    //short entries need rsi above this
    pub rsi_short_above: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub order_block_window: usize,
}

impl Default for OptimizedIctParams {
    fn default() -> Self {
        OptimizedIctParams {
            ema_period: 200,
            atr_period: 14,
            atr_multiplier: 1.5,
            rsi_period: 14,
            rsi_long_below: 10.0,
            rsi_short_above: 90.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            order_block_window: 12,
        }
    }
}

impl OptimizedIctParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("ema_period", self.ema_period),
            ("atr_period", self.atr_period),
            ("rsi_period", self.rsi_period),
            ("macd_signal", self.macd_signal),
            ("order_block_window", self.order_block_window),
        ] {
            if value == 0 {
                return Err(invalid(name, "must be at least 1"));
            }
        }
        if self.macd_fast == 0 || self.macd_fast >= self.macd_slow {
            return Err(invalid(
                "macd_fast",
                format!(
                    "must be positive and below macd_slow ({} >= {})",
                    self.macd_fast, self.macd_slow
                ),
            ));
        }
        if self.atr_multiplier < 0.0 {
            return Err(invalid("atr_multiplier", "must not be negative"));
        }
        Ok(())
    }
}

//two consecutive candles strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoBullishCandlesParams {
    //leverage requested per trade, clamped to the pair maximum
    pub leverage: f64,
}

impl Default for TwoBullishCandlesParams {
    fn default() -> Self {
        TwoBullishCandlesParams { leverage: 30.0 }
    }
}

impl TwoBullishCandlesParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leverage.is_nan() || self.leverage < 1.0 {
            return Err(invalid(
                "leverage",
                format!("must be at least 1, got {}", self.leverage),
            ));
        }
        Ok(())
    }
}

//strategy-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyParams {
    RangeFilter(RangeFilterParams),
    Ict(IctParams),
    OptimizedIct(OptimizedIctParams),
    TwoBullishCandles(TwoBullishCandlesParams),
}

impl StrategyParams {
    pub fn strategy_type(&self) -> StrategyType {
        match self {
            StrategyParams::RangeFilter(_) => StrategyType::RangeFilter,
            StrategyParams::Ict(_) => StrategyType::Ict,
            StrategyParams::OptimizedIct(_) => StrategyType::OptimizedIct,
            StrategyParams::TwoBullishCandles(_) => StrategyType::TwoBullishCandles,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StrategyParams::RangeFilter(p) => p.validate(),
            StrategyParams::Ict(p) => p.validate(),
            StrategyParams::OptimizedIct(p) => p.validate(),
            StrategyParams::TwoBullishCandles(p) => p.validate(),
        }
    }
}

//complete analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfiguration {
    //data
    pub data_path: PathBuf,
    //analyze only this pair; all pairs when unset
    pub pair: Option<String>,
    //overrides the strategy's own timeframe in pair metadata
    pub timeframe: Option<String>,

    //strategy
    pub strategy_type: StrategyType,
    pub strategy_params: StrategyParams,

    //optional output paths
    pub output_frame_csv: Option<PathBuf>,
    pub output_signals_csv: Option<PathBuf>,
}

impl Default for StrategyConfiguration {
    fn default() -> Self {
        StrategyConfiguration::for_strategy(StrategyType::RangeFilter)
    }
}

impl StrategyConfiguration {
    //default configuration for the given strategy
    pub fn for_strategy(strategy_type: StrategyType) -> Self {
        StrategyConfiguration {
            data_path: PathBuf::from("data.csv"),
            pair: None,
            timeframe: None,
            strategy_type,
            strategy_params: strategy_type.default_params(),
            output_frame_csv: None,
            output_signals_csv: None,
        }
    }

    //checks that the parameters belong to the strategy and are in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let found = self.strategy_params.strategy_type();
        if found != self.strategy_type {
            return Err(ConfigError::ParamsMismatch {
                expected: self.strategy_type,
                found,
            });
        }
        self.strategy_params.validate()
    }

    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: StrategyConfiguration = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
