use crate::config::RangeFilterParams;
use crate::data::{Column, Frame, PairMetadata};
use crate::indicators::range_filter::{
    conditions, directions, is_long_cross, is_short_cross, range_filter, range_size, triggers,
    Condition, Direction,
};
use crate::strategy::{Strategy, StrategyError, StrategySettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

//how exits relate to the persisted condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    //exit whenever price crosses back through the filter with the filter turning
    #[default]
    Unconditional,
    //additionally require the previous condition to still match the open side
    Gated,
}

//range filter trend strategy
//enters on the first cross that reverses the persisted condition
//exits when price crosses back through the filter line
#[derive(Debug, Clone)]
pub struct RangeFilterStrategy {
    params: RangeFilterParams,
    settings: StrategySettings,
}

impl RangeFilterStrategy {
    pub fn new(params: RangeFilterParams) -> Self {
        let settings = StrategySettings {
            timeframe: "5m".to_string(),
            can_short: true,
            startup_candle_count: params.period * 2,
            stoploss: -0.7,
            minimal_roi: vec![(0, 99.0)],
            trailing_stop: None,
        };
        RangeFilterStrategy { params, settings }
    }

    pub fn params(&self) -> &RangeFilterParams {
        &self.params
    }
}

impl Default for RangeFilterStrategy {
    fn default() -> Self {
        Self::new(RangeFilterParams::default())
    }
}

//persisted condition one row back, None on the first row
fn previous(conds: &[Condition], i: usize) -> Condition {
    if i == 0 {
        Condition::None
    } else {
        conds[i - 1]
    }
}

impl Strategy for RangeFilterStrategy {
    fn name(&self) -> &str {
        "Range Filter"
    }

    fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    fn populate_indicators(
        &self,
        frame: &mut Frame,
        metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let p = &self.params;
        let close = frame.closes();

        let size = range_size(frame.candles(), p.period, p.qty, p.source);
        let output = range_filter(&close, &size, p.period, p.nan_policy)?;
        let dirs = directions(&output.filter);
        let conds = conditions(&triggers(&close, &output.filter, &dirs));

        debug!(
            pair = %metadata.pair,
            rows = frame.len(),
            defined = size.iter().filter(|v| !v.is_nan()).count(),
            "Range filter computed"
        );

        let upward = dirs.iter().map(|d| *d == Direction::Up).collect();
        let downward = dirs.iter().map(|d| *d == Direction::Down).collect();

        frame.insert_values("range_size", size)?;
        frame.insert_values("filter", output.filter)?;
        frame.insert_values("high_band", output.high_band)?;
        frame.insert_values("low_band", output.low_band)?;
        frame.insert("fdir", Column::Directions(dirs))?;
        frame.insert_flags("upward", upward)?;
        frame.insert_flags("downward", downward)?;
        frame.insert("cond_ini", Column::Conditions(conds))?;
        Ok(())
    }

    fn populate_entry_trend(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let close = frame.closes();
        let filter = frame.values("filter")?.to_vec();
        let dirs = frame.directions("fdir")?.to_vec();
        let conds = frame.conditions("cond_ini")?.to_vec();

        for i in 0..frame.len() {
            let before = previous(&conds, i);

            if is_long_cross(&close, &filter, &dirs, i) && before == Condition::Short {
                frame.signals.mark_enter_long(i, &self.params.enter_long_tag);
            }

            if is_short_cross(&close, &filter, &dirs, i) && before == Condition::Long {
                frame
                    .signals
                    .mark_enter_short(i, &self.params.enter_short_tag);
            }
        }
        Ok(())
    }

    fn populate_exit_trend(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let close = frame.closes();
        let filter = frame.values("filter")?.to_vec();
        let dirs = frame.directions("fdir")?.to_vec();
        let conds = frame.conditions("cond_ini")?.to_vec();
        let gated = self.params.exit_policy == ExitPolicy::Gated;

        for i in 0..frame.len() {
            let before = previous(&conds, i);

            let crossed_down = close[i] < filter[i] && dirs[i] == Direction::Down;
            if crossed_down && (!gated || before == Condition::Long) {
                frame
                    .signals
                    .mark_exit_long(i, Some(&self.params.exit_long_tag));
            }

            let crossed_up = close[i] > filter[i] && dirs[i] == Direction::Up;
            if crossed_up && (!gated || before == Condition::Short) {
                frame
                    .signals
                    .mark_exit_short(i, Some(&self.params.exit_short_tag));
            }
        }
        Ok(())
    }
}
