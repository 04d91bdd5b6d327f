//range filter and ICT-style strategy plug-ins over OHLC candle sequences

pub mod config;
pub mod data;
pub mod indicators;
pub mod metrics;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        parse_strategy, resolve_configuration, ConfigError, ConfigOverrides, IctParams,
        OptimizedIctParams, RangeFilterParams, StrategyConfiguration, StrategyParams, StrategyType,
        TwoBullishCandlesParams,
    };
    pub use crate::data::{
        filter_by_pair, group_by_pair, load_csv, Candle, Column, Frame, PairMetadata, Signals,
    };
    pub use crate::indicators::range_filter::{
        Condition, Direction, NanPolicy, RangeFilterOutput, RangeSource, Trigger,
    };
    pub use crate::metrics::{
        collect_events, pairs_table, write_frame_csv, write_signals_csv, SignalEvent, SignalKind,
        SignalSummary,
    };
    pub use crate::strategy::{
        analyze, build_strategy, ict::IctStrategy, optimized_ict::OptimizedIctStrategy,
        range_filter::ExitPolicy, range_filter::RangeFilterStrategy,
        two_bullish_candles::TwoBullishCandlesStrategy, LeverageRequest, StakeRequest, Strategy,
        StrategyError, StrategySettings, TradeSide, TradeSnapshot,
    };
}
