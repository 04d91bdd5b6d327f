pub mod overrides;
pub mod strategy_config;

pub use overrides::{parse_exit_policy, parse_strategy, resolve_configuration, ConfigOverrides};

pub use strategy_config::{
    ConfigError, IctParams, OptimizedIctParams, RangeFilterParams, StrategyConfiguration,
    StrategyParams, StrategyType, TwoBullishCandlesParams,
};
