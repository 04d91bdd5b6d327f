//range filter: a staircase line that only moves when price escapes a
//volatility-scaled band around it

use crate::data::{Candle, FrameError};
use crate::indicators::{ema, true_range};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

//volatility measure fed into the double smoothing of range_size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSource {
    //max(high - low, |high - prev close|, |low - prev close|)
    #[default]
    TrueRange,
    //|close - prev close|
    CloseChange,
}

//what the filter does on a live row whose range is undefined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NanPolicy {
    //both band comparisons fail and the previous filter value is held
    #[default]
    Hold,
    //the row is NaN; the last defined filter value is kept as state
    Propagate,
}

//range size: the source series smoothed by an EMA of span n, then by an
//EMA of span 2n - 1, scaled by qty
pub fn range_size(candles: &[Candle], n: usize, qty: f64, source: RangeSource) -> Vec<f64> {
    let raw = match source {
        RangeSource::TrueRange => true_range(candles),
        RangeSource::CloseChange => {
            let mut out = vec![f64::NAN; candles.len()];
            for i in 1..candles.len() {
                out[i] = (candles[i].close - candles[i - 1].close).abs();
            }
            out
        }
    };

    let average_range = ema(&raw, n);
    let wper = (n * 2).saturating_sub(1);
    ema(&average_range, wper)
        .into_iter()
        .map(|v| v * qty)
        .collect()
}

//filter line with its bands
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilterOutput {
    pub filter: Vec<f64>,
    pub high_band: Vec<f64>,
    pub low_band: Vec<f64>,
}

//runs the band-escape recurrence
//rows before warmup are seeded with the close, a warmup of zero counts as one
pub fn range_filter(
    close: &[f64],
    range: &[f64],
    warmup: usize,
    nan_policy: NanPolicy,
) -> Result<RangeFilterOutput, FrameError> {
    if range.len() != close.len() {
        return Err(FrameError::LengthMismatch {
            name: "range_size".to_string(),
            len: range.len(),
            rows: close.len(),
        });
    }

    let len = close.len();
    let seed = warmup.max(1).min(len);
    let mut filter = close.to_vec();

    if seed > 0 {
        let mut prev = close[seed - 1];
        let mut undefined = 0usize;

        for i in seed..len {
            let (c, r) = (close[i], range[i]);
            if r.is_nan() {
                undefined += 1;
                filter[i] = match nan_policy {
                    NanPolicy::Hold => prev,
                    NanPolicy::Propagate => f64::NAN,
                };
                continue;
            }

            prev = step(prev, c, r);
            filter[i] = prev;
        }

        if undefined > 0 {
            warn!(
                rows = undefined,
                policy = ?nan_policy,
                "Range size undefined on live filter rows"
            );
        }
    }

    let high_band = filter.iter().zip(range).map(|(f, r)| f + r).collect();
    let low_band = filter.iter().zip(range).map(|(f, r)| f - r).collect();

    Ok(RangeFilterOutput {
        filter,
        high_band,
        low_band,
    })
}

//one step of the recurrence. The two escape branches are disjoint for a
//non-negative range
pub fn step(prev: f64, close: f64, range: f64) -> f64 {
    if close - range > prev {
        close - range
    } else if close + range < prev {
        close + range
    } else {
        prev
    }
}

//slope of the filter line between two rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Flat,
}

impl Direction {
    pub fn between(prev: f64, curr: f64) -> Self {
        if curr > prev {
            Direction::Up
        } else if curr < prev {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    pub fn signum(self) -> i8 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Flat => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Flat => write!(f, "flat"),
        }
    }
}

//direction per row; the first row is flat
pub fn directions(filter: &[f64]) -> Vec<Direction> {
    let mut out = vec![Direction::Flat; filter.len()];
    for i in 1..filter.len() {
        out[i] = Direction::between(filter[i - 1], filter[i]);
    }
    out
}

//condition raised on a single row, before forward-filling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Long,
    Short,
    None,
}

//persisted long/short state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Long,
    Short,
    #[default]
    None,
}

impl Condition {
    //moves to the triggered side, otherwise stays put
    pub fn next(self, trigger: Trigger) -> Condition {
        match trigger {
            Trigger::Long => Condition::Long,
            Trigger::Short => Condition::Short,
            Trigger::None => self,
        }
    }

    pub fn signum(self) -> i8 {
        match self {
            Condition::Long => 1,
            Condition::Short => -1,
            Condition::None => 0,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Long => write!(f, "long"),
            Condition::Short => write!(f, "short"),
            Condition::None => write!(f, "none"),
        }
    }
}

//true when row i closes above the filter, above the previous close, with
//the filter rising. Row 0 has no previous close and never qualifies
pub fn is_long_cross(close: &[f64], filter: &[f64], dirs: &[Direction], i: usize) -> bool {
    i > 0 && close[i] > filter[i] && close[i] > close[i - 1] && dirs[i] == Direction::Up
}

//mirror of is_long_cross
pub fn is_short_cross(close: &[f64], filter: &[f64], dirs: &[Direction], i: usize) -> bool {
    i > 0 && close[i] < filter[i] && close[i] < close[i - 1] && dirs[i] == Direction::Down
}

pub fn triggers(close: &[f64], filter: &[f64], dirs: &[Direction]) -> Vec<Trigger> {
    (0..close.len())
        .map(|i| {
            if is_long_cross(close, filter, dirs, i) {
                Trigger::Long
            } else if is_short_cross(close, filter, dirs, i) {
                Trigger::Short
            } else {
                Trigger::None
            }
        })
        .collect()
}

//forward-fills triggers starting from Condition::None
pub fn conditions(triggers: &[Trigger]) -> Vec<Condition> {
    triggers
        .iter()
        .scan(Condition::None, |state, &trigger| {
            *state = state.next(trigger);
            Some(*state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::candle::fixtures::{candles, from_closes};

    #[test]
    fn seed_rows_equal_close() {
        let close = [5.0, 6.0, 7.0, 8.0];
        let range = [0.0; 4];
        let out = range_filter(&close, &range, 3, NanPolicy::Hold).unwrap();
        assert_eq!(&out.filter[..3], &close[..3]);
    }

    #[test]
    fn flat_then_jump_fixture() {
        let close = [10.0, 10.0, 10.0, 11.0, 9.0];
        let range = [0.0, 0.0, 0.0, 1.0, 1.0];
        let out = range_filter(&close, &range, 1, NanPolicy::Hold).unwrap();
        assert_eq!(out.filter, vec![10.0; 5]);
        assert_eq!(out.high_band, vec![10.0, 10.0, 10.0, 11.0, 11.0]);
        assert_eq!(out.low_band, vec![10.0, 10.0, 10.0, 9.0, 9.0]);
    }

    #[test]
    fn zero_warmup_behaves_like_one() {
        let close = [10.0, 12.0, 8.0];
        let range = [1.0; 3];
        assert_eq!(
            range_filter(&close, &range, 0, NanPolicy::Hold).unwrap(),
            range_filter(&close, &range, 1, NanPolicy::Hold).unwrap()
        );
    }

    #[test]
    fn escapes_move_the_line() {
        let close = [10.0, 13.0, 12.5, 7.0];
        let range = [1.0; 4];
        let out = range_filter(&close, &range, 1, NanPolicy::Hold).unwrap();
        // 13 - 1 > 10, then 12 sits inside [11.5, 13.5], then 7 + 1 < 12
        assert_eq!(out.filter, vec![10.0, 12.0, 12.0, 8.0]);
    }

    #[test]
    fn warmup_longer_than_series_is_all_seed() {
        let close = [1.0, 2.0];
        let out = range_filter(&close, &[f64::NAN; 2], 10, NanPolicy::Hold).unwrap();
        assert_eq!(out.filter, close.to_vec());
    }

    #[test]
    fn nan_range_holds_previous_value() {
        let close = [10.0, 20.0, 30.0];
        let range = [f64::NAN, f64::NAN, 1.0];
        let out = range_filter(&close, &range, 1, NanPolicy::Hold).unwrap();
        assert_eq!(out.filter, vec![10.0, 10.0, 29.0]);
    }

    #[test]
    fn nan_range_propagates_and_recovers() {
        let close = [10.0, 20.0, 30.0];
        let range = [f64::NAN, f64::NAN, 1.0];
        let out = range_filter(&close, &range, 1, NanPolicy::Propagate).unwrap();
        assert_eq!(out.filter[0], 10.0);
        assert!(out.filter[1].is_nan());
        assert_eq!(out.filter[2], 29.0);
    }

    #[test]
    fn direction_starts_flat() {
        let dirs = directions(&[1.0, 2.0, 2.0, 1.0, f64::NAN]);
        assert_eq!(
            dirs,
            vec![
                Direction::Flat,
                Direction::Up,
                Direction::Flat,
                Direction::Down,
                Direction::Flat
            ]
        );
    }

    #[test]
    fn condition_transition_is_sticky() {
        assert_eq!(Condition::None.next(Trigger::None), Condition::None);
        assert_eq!(Condition::None.next(Trigger::Long), Condition::Long);
        assert_eq!(Condition::Long.next(Trigger::None), Condition::Long);
        assert_eq!(Condition::Long.next(Trigger::Short), Condition::Short);
        assert_eq!(Condition::Short.next(Trigger::Long), Condition::Long);
    }

    #[test]
    fn conditions_forward_fill() {
        let t = [
            Trigger::None,
            Trigger::Long,
            Trigger::None,
            Trigger::Short,
            Trigger::None,
        ];
        assert_eq!(
            conditions(&t),
            vec![
                Condition::None,
                Condition::Long,
                Condition::Long,
                Condition::Short,
                Condition::Short
            ]
        );
    }

    #[test]
    fn rising_prices_turn_long() {
        let close: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let range = vec![0.5; close.len()];
        let out = range_filter(&close, &range, 3, NanPolicy::Hold).unwrap();
        assert_eq!(out.filter[3], 102.5);

        let dirs = directions(&out.filter);
        assert_eq!(dirs[0], Direction::Flat);
        assert!(dirs[3..].iter().all(|d| *d == Direction::Up));

        // seed rows sit on the close, so the first cross is the first live row
        let conds = conditions(&triggers(&close, &out.filter, &dirs));
        assert!(conds[..3].iter().all(|c| *c == Condition::None));
        assert!(conds[3..].iter().all(|c| *c == Condition::Long));
    }

    #[test]
    fn rising_prices_with_zero_range_never_trigger() {
        let close: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let range = vec![0.0; close.len()];
        let out = range_filter(&close, &range, 3, NanPolicy::Hold).unwrap();
        assert_eq!(out.filter, close);

        let dirs = directions(&out.filter);
        assert_eq!(dirs[0], Direction::Flat);
        assert!(dirs[3..].iter().all(|d| *d == Direction::Up));

        // the filter sits on the close, so the strict close > filter test fails
        let trig = triggers(&close, &out.filter, &dirs);
        assert!(trig.iter().all(|t| *t == Trigger::None));
        assert!(conditions(&trig).iter().all(|c| *c == Condition::None));
    }

    #[test]
    fn mismatched_lengths_are_an_error() {
        let err = range_filter(&[1.0, 2.0, 3.0], &[0.5, 0.5], 1, NanPolicy::Hold).unwrap_err();
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                name: "range_size".to_string(),
                len: 2,
                rows: 3
            }
        );
    }

    #[test]
    fn true_range_size_is_double_smoothed() {
        // constant true range of 2 after the first row
        let rows: Vec<_> = (0..12).map(|_| (10.0, 11.0, 9.0, 10.0)).collect();
        let size = range_size(&candles(&rows), 3, 1.5, RangeSource::TrueRange);
        // tr valid from 1, ema(3) from 3, ema(5) from 7
        assert!(size[6].is_nan());
        assert!((size[7] - 3.0).abs() < 1e-12);
        assert!((size[11] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn close_change_size() {
        let size = range_size(
            &from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            1,
            2.0,
            RangeSource::CloseChange,
        );
        assert!(size[0].is_nan());
        assert_eq!(&size[1..], &[2.0, 2.0, 2.0, 2.0]);
    }
}
