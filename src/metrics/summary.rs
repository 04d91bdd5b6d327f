use crate::data::{Column, Frame};
use crate::indicators::range_filter::Condition;
use chrono::{DateTime, Utc};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

//signal counts for one analyzed pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub strategy: String,
    pub pair: String,
    pub rows: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub last_close: Option<f64>,
    //rows where any numeric column is still undefined
    pub warmup_rows: usize,
    pub enter_long: usize,
    pub enter_short: usize,
    pub exit_long: usize,
    pub exit_short: usize,
    //persisted trade condition on the last row, for strategies that track one
    pub final_condition: Option<Condition>,
}

impl SignalSummary {
    pub fn from_frame(strategy: &str, pair: &str, frame: &Frame) -> Self {
        let count = |flags: &[bool]| flags.iter().filter(|x| **x).count();
        let s = &frame.signals;

        let warmup_rows = (0..frame.len())
            .filter(|&i| {
                frame.columns().any(|(_, column)| match column {
                    Column::Values(v) => v[i].is_nan(),
                    _ => false,
                })
            })
            .count();

        let final_condition = frame
            .conditions("cond_ini")
            .ok()
            .and_then(|c| c.last().copied());

        SignalSummary {
            strategy: strategy.to_string(),
            pair: pair.to_string(),
            rows: frame.len(),
            first_timestamp: frame.candles().first().map(|c| c.timestamp),
            last_timestamp: frame.candles().last().map(|c| c.timestamp),
            last_close: frame.candles().last().map(|c| c.close),
            warmup_rows,
            enter_long: count(&s.enter_long),
            enter_short: count(&s.enter_short),
            exit_long: count(&s.exit_long),
            exit_short: count(&s.exit_short),
            final_condition,
        }
    }

    pub fn total_signals(&self) -> usize {
        self.enter_long + self.enter_short + self.exit_long + self.exit_short
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        let timestamp = |t: Option<DateTime<Utc>>| {
            t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
        };

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Strategy"),
            Cell::new(&self.strategy),
        ]));

        table.add_row(Row::new(vec![Cell::new("Pair"), Cell::new(&self.pair)]));

        table.add_row(Row::new(vec![
            Cell::new("Candles"),
            Cell::new(&format!("{}", self.rows)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("From"),
            Cell::new(&timestamp(self.first_timestamp)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("To"),
            Cell::new(&timestamp(self.last_timestamp)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Warm-up Rows"),
            Cell::new(&format!("{}", self.warmup_rows)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Long Entries"),
            Cell::new(&format!("{}", self.enter_long)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Short Entries"),
            Cell::new(&format!("{}", self.enter_short)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Long Exits"),
            Cell::new(&format!("{}", self.exit_long)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Short Exits"),
            Cell::new(&format!("{}", self.exit_short)),
        ]));

        if let Some(close) = self.last_close {
            table.add_row(Row::new(vec![
                Cell::new("Last Close"),
                Cell::new(&format!("{:.4}", close)),
            ]));
        }

        if let Some(condition) = self.final_condition {
            table.add_row(Row::new(vec![
                Cell::new("Final Condition"),
                Cell::new(&condition.to_string()),
            ]));
        }

        table
    }

    //prints the summary in a formatted table
    pub fn pretty_print_table(&self) {
        self.table().printstd();
    }
}

//one line per pair, for multi-pair runs
pub fn pairs_table(summaries: &[SignalSummary]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Pair"),
        Cell::new("Candles"),
        Cell::new("Enter Long"),
        Cell::new("Enter Short"),
        Cell::new("Exit Long"),
        Cell::new("Exit Short"),
    ]));

    for s in summaries {
        table.add_row(Row::new(vec![
            Cell::new(&s.pair),
            Cell::new(&format!("{}", s.rows)),
            Cell::new(&format!("{}", s.enter_long)),
            Cell::new(&format!("{}", s.enter_short)),
            Cell::new(&format!("{}", s.exit_long)),
            Cell::new(&format!("{}", s.exit_short)),
        ]));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::candle::fixtures::from_closes;

    #[test]
    fn counts_flags_and_warmup() {
        let mut frame = Frame::new(from_closes(&[1.0, 2.0, 3.0, 4.0]));
        frame
            .insert_values("sma", vec![f64::NAN, f64::NAN, 2.0, 3.0])
            .unwrap();
        frame.insert_flags("up", vec![true; 4]).unwrap();
        frame.signals.mark_enter_long(2, "a");
        frame.signals.mark_enter_long(3, "a");
        frame.signals.mark_exit_short(3, None);

        let summary = SignalSummary::from_frame("Test", "BTC/USDT", &frame);
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.warmup_rows, 2);
        assert_eq!(summary.enter_long, 2);
        assert_eq!(summary.exit_short, 1);
        assert_eq!(summary.total_signals(), 3);
        assert_eq!(summary.last_close, Some(4.0));
        assert_eq!(summary.final_condition, None);
        // header plus eleven metric rows, no condition row
        assert_eq!(summary.table().len(), 12);
    }

    #[test]
    fn empty_frame() {
        let summary = SignalSummary::from_frame("Test", "BTC/USDT", &Frame::new(Vec::new()));
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.first_timestamp, None);
        assert_eq!(summary.last_close, None);
        assert_eq!(pairs_table(&[summary]).len(), 2);
    }
}
