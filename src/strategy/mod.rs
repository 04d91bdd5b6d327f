pub mod ict;
pub mod optimized_ict;
pub mod range_filter;
pub mod two_bullish_candles;

use crate::config::{ConfigError, StrategyParams, StrategyType};
use crate::data::{Candle, Frame, FrameError, PairMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use self::ict::IctStrategy;
use self::optimized_ict::OptimizedIctStrategy;
use self::range_filter::RangeFilterStrategy;
use self::two_bullish_candles::TwoBullishCandlesStrategy;

#[derive(Error, Debug, PartialEq)]
pub enum StrategyError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

//trade direction as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Long,
    Short,
}

//trailing stop settings, ratios relative to the current price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingStop {
    pub positive: f64,
    pub positive_offset: f64,
    pub only_offset_is_reached: bool,
}

//static settings the host reads before the first cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySettings {
    pub timeframe: String,
    pub can_short: bool,
    //candles needed before signals are meaningful
    pub startup_candle_count: usize,
    //negative ratio, eg -0.02 for 2%
    pub stoploss: f64,
    //(minutes in trade, minimum profit ratio) pairs
    pub minimal_roi: Vec<(u32, f64)>,
    pub trailing_stop: Option<TrailingStop>,
}

//open trade state handed to the per-trade callbacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSnapshot {
    pub pair: String,
    pub side: TradeSide,
    pub open_rate: f64,
    pub current_rate: f64,
    pub current_profit: f64,
    pub open_timestamp: DateTime<Utc>,
}

//arguments of the leverage callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageRequest {
    pub pair: String,
    pub current_rate: f64,
    pub proposed_leverage: f64,
    pub max_leverage: f64,
    pub side: TradeSide,
}

impl LeverageRequest {
    //clamps a wanted leverage into [1.0, max_leverage]
    pub fn clamp(&self, wanted: f64) -> f64 {
        wanted.min(self.max_leverage).max(1.0)
    }
}

//arguments of the stake callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRequest {
    pub pair: String,
    pub current_rate: f64,
    pub proposed_stake: f64,
    pub min_stake: Option<f64>,
    pub max_stake: f64,
    pub entry_tag: Option<String>,
}

//strategy interface consumed by the host
//populate steps run in order: indicators, entry, exit
pub trait Strategy: Send + Sync {
    //returns the strategy name
    fn name(&self) -> &str;

    fn settings(&self) -> &StrategySettings;

    //adds indicator columns to the frame
    fn populate_indicators(
        &self,
        frame: &mut Frame,
        metadata: &PairMetadata,
    ) -> Result<(), StrategyError>;

    //sets enter_long / enter_short and enter_tag
    fn populate_entry_trend(
        &self,
        frame: &mut Frame,
        metadata: &PairMetadata,
    ) -> Result<(), StrategyError>;

    //sets exit_long / exit_short and exit_tag
    fn populate_exit_trend(
        &self,
        frame: &mut Frame,
        metadata: &PairMetadata,
    ) -> Result<(), StrategyError>;

    //leverage for a new trade, always within [1.0, max_leverage]
    fn leverage(&self, request: &LeverageRequest) -> f64 {
        request.clamp(request.max_leverage)
    }

    //stoploss relative to the current rate; None keeps the static stoploss
    fn custom_stoploss(&self, _frame: &Frame, _trade: &TradeSnapshot) -> Option<f64> {
        None
    }

    //price at which to place the exit order
    fn custom_exit_price(&self, _frame: &Frame, _trade: &TradeSnapshot, proposed_rate: f64) -> f64 {
        proposed_rate
    }

    //stake for a new trade
    fn custom_stake_amount(&self, request: &StakeRequest) -> f64 {
        let floor = request.min_stake.unwrap_or(0.0);
        request.proposed_stake.min(request.max_stake).max(floor)
    }
}

//runs all three populate steps on a fresh frame
pub fn analyze(
    strategy: &dyn Strategy,
    candles: Vec<Candle>,
    metadata: &PairMetadata,
) -> Result<Frame, StrategyError> {
    let mut frame = Frame::new(candles);

    strategy.populate_indicators(&mut frame, metadata)?;
    strategy.populate_entry_trend(&mut frame, metadata)?;
    strategy.populate_exit_trend(&mut frame, metadata)?;

    debug!(
        strategy = strategy.name(),
        pair = %metadata.pair,
        rows = frame.len(),
        "Analyzed frame"
    );
    Ok(frame)
}

//builds a strategy from its type and parameters
pub fn build_strategy(
    strategy_type: StrategyType,
    params: &StrategyParams,
) -> Result<Box<dyn Strategy>, ConfigError> {
    params.validate()?;

    let strategy: Box<dyn Strategy> = match (strategy_type, params) {
        (StrategyType::RangeFilter, StrategyParams::RangeFilter(p)) => {
            Box::new(RangeFilterStrategy::new(p.clone()))
        }
        (StrategyType::Ict, StrategyParams::Ict(p)) => Box::new(IctStrategy::new(p.clone())),
        (StrategyType::OptimizedIct, StrategyParams::OptimizedIct(p)) => {
            Box::new(OptimizedIctStrategy::new(p.clone()))
        }
        (StrategyType::TwoBullishCandles, StrategyParams::TwoBullishCandles(p)) => {
            Box::new(TwoBullishCandlesStrategy::new(p.clone()))
        }
        (expected, found) => {
            return Err(ConfigError::ParamsMismatch {
                expected,
                found: found.strategy_type(),
            })
        }
    };

    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IctParams, RangeFilterParams};

    fn request(max_leverage: f64) -> LeverageRequest {
        LeverageRequest {
            pair: "BTC/USDT".into(),
            current_rate: 100.0,
            proposed_leverage: 1.0,
            max_leverage,
            side: TradeSide::Long,
        }
    }

    #[test]
    fn leverage_clamp() {
        assert_eq!(request(10.0).clamp(30.0), 10.0);
        assert_eq!(request(50.0).clamp(30.0), 30.0);
        assert_eq!(request(0.5).clamp(30.0), 1.0);
    }

    #[test]
    fn build_rejects_mismatched_params() {
        let err = build_strategy(
            StrategyType::RangeFilter,
            &StrategyParams::Ict(IctParams::default()),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            ConfigError::ParamsMismatch {
                expected: StrategyType::RangeFilter,
                found: StrategyType::Ict
            }
        );
    }

    #[test]
    fn build_validates_params() {
        let params = RangeFilterParams {
            period: 0,
            ..RangeFilterParams::default()
        };
        let built = build_strategy(
            StrategyType::RangeFilter,
            &StrategyParams::RangeFilter(params),
        );
        assert!(built.is_err());
    }

    #[test]
    fn default_stake_is_proposed_within_bounds() {
        let strategy =
            build_strategy(StrategyType::Ict, &StrategyParams::Ict(IctParams::default())).unwrap();
        let mut req = StakeRequest {
            pair: "BTC/USDT".into(),
            current_rate: 100.0,
            proposed_stake: 50.0,
            min_stake: Some(10.0),
            max_stake: 100.0,
            entry_tag: None,
        };
        assert_eq!(strategy.custom_stake_amount(&req), 50.0);
        req.proposed_stake = 500.0;
        assert_eq!(strategy.custom_stake_amount(&req), 100.0);
        req.proposed_stake = 1.0;
        assert_eq!(strategy.custom_stake_amount(&req), 10.0);
    }
}
