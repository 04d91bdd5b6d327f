use crate::config::{ConfigError, StrategyConfiguration, StrategyParams, StrategyType};
use crate::strategy::range_filter::ExitPolicy;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

//command line values layered over a configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub data: Option<PathBuf>,
    pub strategy: Option<String>,
    pub pair: Option<String>,
    pub timeframe: Option<String>,
    pub rng_per: Option<usize>,
    pub rng_qty: Option<f64>,
    pub exit_policy: Option<String>,
    pub output_frame_csv: Option<PathBuf>,
    pub output_signals_csv: Option<PathBuf>,
}

pub fn parse_strategy(name: &str) -> Result<StrategyType, ConfigError> {
    StrategyType::parse(name).ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))
}

pub fn parse_exit_policy(name: &str) -> Result<ExitPolicy> {
    match name.trim().to_lowercase().as_str() {
        "unconditional" => Ok(ExitPolicy::Unconditional),
        "gated" => Ok(ExitPolicy::Gated),
        other => anyhow::bail!(
            "Unknown exit policy: {} (expected unconditional or gated)",
            other
        ),
    }
}

//builds the effective configuration: file first, then flags, then validation
pub fn resolve_configuration(
    config_path: Option<&PathBuf>,
    overrides: ConfigOverrides,
) -> Result<StrategyConfiguration> {
    let mut configuration = match (config_path, &overrides.strategy) {
        (Some(path), _) => StrategyConfiguration::from_json_file(path)
            .context(format!("Failed to load configuration from {:?}", path))?,
        (None, Some(name)) => StrategyConfiguration::for_strategy(parse_strategy(name)?),
        (None, None) => anyhow::bail!("Either --config or --strategy is required"),
    };

    //a strategy flag that disagrees with the file replaces its parameters
    if let (Some(_), Some(name)) = (config_path, &overrides.strategy) {
        let strategy_type = parse_strategy(name)?;
        if strategy_type != configuration.strategy_type {
            warn!(
                file = %configuration.strategy_type,
                flag = %strategy_type,
                "Strategy flag overrides configuration file, using default parameters"
            );
            configuration.strategy_type = strategy_type;
            configuration.strategy_params = strategy_type.default_params();
        }
    }

    match (config_path.is_some(), overrides.data) {
        (_, Some(data)) => configuration.data_path = data,
        (false, None) => anyhow::bail!("--data is required without --config"),
        (true, None) => {}
    }

    if overrides.pair.is_some() {
        configuration.pair = overrides.pair;
    }
    if overrides.timeframe.is_some() {
        configuration.timeframe = overrides.timeframe;
    }
    if overrides.output_frame_csv.is_some() {
        configuration.output_frame_csv = overrides.output_frame_csv;
    }
    if overrides.output_signals_csv.is_some() {
        configuration.output_signals_csv = overrides.output_signals_csv;
    }

    let wants_range_params = overrides.rng_per.is_some()
        || overrides.rng_qty.is_some()
        || overrides.exit_policy.is_some();
    match &mut configuration.strategy_params {
        StrategyParams::RangeFilter(params) => {
            if let Some(period) = overrides.rng_per {
                params.period = period;
            }
            if let Some(qty) = overrides.rng_qty {
                params.qty = qty;
            }
            if let Some(policy) = &overrides.exit_policy {
                params.exit_policy = parse_exit_policy(policy)?;
            }
        }
        _ if wants_range_params => {
            warn!(
                strategy = %configuration.strategy_type,
                "Range filter flags ignored for this strategy"
            );
        }
        _ => {}
    }

    configuration.validate()?;
    Ok(configuration)
}
