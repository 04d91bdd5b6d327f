use crate::data::Frame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::EnterLong => write!(f, "enter_long"),
            SignalKind::EnterShort => write!(f, "enter_short"),
            SignalKind::ExitLong => write!(f, "exit_long"),
            SignalKind::ExitShort => write!(f, "exit_short"),
        }
    }
}

//one raised signal flag, flattened for csv output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub kind: SignalKind,
    pub tag: Option<String>,
    pub close: f64,
}

//lists every raised flag in row order; within a row entries come before exits
pub fn collect_events(frame: &Frame) -> Vec<SignalEvent> {
    let s = &frame.signals;
    let mut events = Vec::new();

    for (i, candle) in frame.candles().iter().enumerate() {
        let raised = [
            (s.enter_long[i], SignalKind::EnterLong, &s.enter_tag[i]),
            (s.enter_short[i], SignalKind::EnterShort, &s.enter_tag[i]),
            (s.exit_long[i], SignalKind::ExitLong, &s.exit_tag[i]),
            (s.exit_short[i], SignalKind::ExitShort, &s.exit_tag[i]),
        ];

        for (set, kind, tag) in raised {
            if set {
                events.push(SignalEvent {
                    timestamp: candle.timestamp,
                    pair: candle.pair.clone(),
                    kind,
                    tag: tag.clone(),
                    close: candle.close,
                });
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::candle::fixtures::from_closes;

    #[test]
    fn events_in_row_order() {
        let mut frame = Frame::new(from_closes(&[1.0, 2.0, 3.0]));
        frame.signals.mark_exit_long(2, Some("stop"));
        frame.signals.mark_enter_long(0, "go");
        frame.signals.mark_enter_short(2, "flip");

        let events = collect_events(&frame);
        let kinds: Vec<SignalKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![SignalKind::EnterLong, SignalKind::EnterShort, SignalKind::ExitLong]
        );
        assert_eq!(events[0].tag.as_deref(), Some("go"));
        assert_eq!(events[2].tag.as_deref(), Some("stop"));
        assert_eq!(events[2].close, 3.0);
        assert_eq!(events[1].pair, "BTC/USDT");
    }

    #[test]
    fn no_flags_no_events() {
        let frame = Frame::new(from_closes(&[1.0, 2.0]));
        assert!(collect_events(&frame).is_empty());
    }
}
