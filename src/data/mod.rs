pub mod candle;
pub mod frame;
pub mod loader;

pub use candle::{Candle, CandleError};
pub use frame::{Column, Frame, FrameError, PairMetadata, Signals};
pub use loader::{filter_by_pair, group_by_pair, load_csv};
