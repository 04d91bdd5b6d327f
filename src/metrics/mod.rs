pub mod events;
pub mod export;
pub mod summary;

pub use events::{collect_events, SignalEvent, SignalKind};
pub use export::{write_frame_csv, write_signals_csv};
pub use summary::{pairs_table, SignalSummary};
