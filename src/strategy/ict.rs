use crate::config::IctParams;
use crate::data::{Frame, PairMetadata};
use crate::indicators::ema;
use crate::indicators::patterns::{fair_value_gaps, order_blocks};
use crate::strategy::{Strategy, StrategyError, StrategySettings, TrailingStop};

pub const BULLISH_ENTRY_TAG: &str = "ICT_Bullish_OB";
pub const BEARISH_ENTRY_TAG: &str = "ICT_Bearish_OB";
pub const BULLISH_EXIT_TAG: &str = "ICT_Bullish_OB_Exit";
pub const BEARISH_EXIT_TAG: &str = "ICT_Bearish_OB_Exit";

//order block strategy with a long ema trend filter
//trades blocks that agree with the trend, exits on blocks against it
#[derive(Debug, Clone)]
pub struct IctStrategy {
    params: IctParams,
    settings: StrategySettings,
}

impl IctStrategy {
    pub fn new(params: IctParams) -> Self {
        IctStrategy {
            params,
            settings: StrategySettings {
                timeframe: "5m".to_string(),
                can_short: true,
                startup_candle_count: 50,
                stoploss: -0.02,
                minimal_roi: vec![(0, 0.1)],
                trailing_stop: Some(TrailingStop {
                    positive: 0.01,
                    positive_offset: 0.015,
                    only_offset_is_reached: false,
                }),
            },
        }
    }

    //trend average column, named after its period (ema200 by default)
    pub fn trend_column(&self) -> String {
        format!("ema{}", self.params.ema_period)
    }
}

impl Default for IctStrategy {
    fn default() -> Self {
        Self::new(IctParams::default())
    }
}

impl Strategy for IctStrategy {
    fn name(&self) -> &str {
        "ICT"
    }

    fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    fn populate_indicators(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let trend = ema(&frame.closes(), self.params.ema_period);
        let blocks = order_blocks(frame.candles(), self.params.order_block_window);
        let gaps = fair_value_gaps(frame.candles());

        frame.insert_values(&self.trend_column(), trend)?;
        frame.insert_flags("bullish_order_block", blocks.bullish)?;
        frame.insert_flags("bearish_order_block", blocks.bearish)?;
        frame.insert_flags("fvg", gaps.fvg)?;
        frame.insert_flags("ifvg", gaps.ifvg)?;
        Ok(())
    }

    fn populate_entry_trend(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let close = frame.closes();
        let trend = frame.values(&self.trend_column())?.to_vec();
        let bullish = frame.flags("bullish_order_block")?.to_vec();
        let bearish = frame.flags("bearish_order_block")?.to_vec();

        for i in 0..frame.len() {
            if bullish[i] && close[i] > trend[i] {
                frame.signals.mark_enter_long(i, BULLISH_ENTRY_TAG);
            }
            if bearish[i] && close[i] < trend[i] {
                frame.signals.mark_enter_short(i, BEARISH_ENTRY_TAG);
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
        let trend = frame.values(&self.trend_column())?.to_vec();
        let bullish = frame.flags("bullish_order_block")?.to_vec();
        let bearish = frame.flags("bearish_order_block")?.to_vec();

        for i in 0..frame.len() {
            if bullish[i] && close[i] < trend[i] {
                frame.signals.mark_exit_long(i, Some(BULLISH_EXIT_TAG));
            }
            if bearish[i] && close[i] > trend[i] {
                frame.signals.mark_exit_short(i, Some(BEARISH_EXIT_TAG));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::candle::fixtures::candles;
    use crate::strategy::analyze;

    fn params() -> IctParams {
        IctParams {
            ema_period: 3,
            order_block_window: 1,
        }
    }

    //gapping staircase: every candle trades above the previous high
    fn gap_up(n: usize) -> Vec<(f64, f64, f64, f64)> {
        (0..n)
            .map(|i| {
                let base = 10.0 + 2.0 * i as f64;
                (base, base + 1.0, base, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn enters_long_on_block_above_trend() {
        let strategy = IctStrategy::new(params());
        let frame = analyze(
            &strategy,
            candles(&gap_up(6)),
            &PairMetadata::new("ETH/USDT", "5m"),
        )
        .unwrap();

        // ema defined from row 2, blocks from row 2
        assert!(!frame.signals.enter_long[1]);
        assert!(frame.signals.enter_long[2..].iter().all(|x| *x));
        assert_eq!(frame.signals.enter_tag[3].as_deref(), Some(BULLISH_ENTRY_TAG));
        assert!(frame.signals.exit_long.iter().all(|x| !x));
        assert!(frame.signals.enter_short.iter().all(|x| !x));
    }

    #[test]
    fn trend_column_follows_period() {
        let frame = analyze(
            &IctStrategy::new(params()),
            candles(&gap_up(4)),
            &PairMetadata::new("ETH/USDT", "5m"),
        )
        .unwrap();
        assert!(frame.values("ema3").is_ok());
        assert!(frame.values("ema200").is_err());
        assert_eq!(IctStrategy::default().trend_column(), "ema200");
    }

    #[test]
    fn undefined_trend_blocks_signals() {
        let strategy = IctStrategy::default();
        let frame = analyze(
            &strategy,
            candles(&gap_up(10)),
            &PairMetadata::new("ETH/USDT", "5m"),
        )
        .unwrap();

        assert!(frame.flags("bullish_order_block").unwrap().iter().any(|x| *x));
        assert!(frame.signals.enter_long.iter().all(|x| !x));
    }

    #[test]
    fn exits_long_on_block_below_trend() {
        // a long run up, then a sharp drop followed by a gapping rebound below the average
        let mut rows = vec![(100.0, 101.0, 99.0, 100.0); 5];
        rows.extend([
            (50.0, 51.0, 50.0, 51.0),
            (52.0, 53.0, 52.0, 53.0),
            (54.0, 55.0, 54.0, 55.0),
        ]);
        let frame = analyze(
            &IctStrategy::new(params()),
            candles(&rows),
            &PairMetadata::new("ETH/USDT", "5m"),
        )
        .unwrap();

        assert!(frame.signals.exit_long[7]);
        assert_eq!(frame.signals.exit_tag[7].as_deref(), Some(BULLISH_EXIT_TAG));
        assert!(!frame.signals.enter_long[7]);
    }
}
