use crate::config::TwoBullishCandlesParams;
use crate::data::{Frame, PairMetadata};
use crate::indicators::patterns::{consecutive_candles, previous_extremes};
use crate::strategy::{
    LeverageRequest, Strategy, StrategyError, StrategySettings, TradeSide, TradeSnapshot,
};

pub const BULLISH_ENTRY_TAG: &str = "Two_Bullish_Candles";
pub const BEARISH_ENTRY_TAG: &str = "Two_Bearish_Candles";

//daily momentum strategy: follow two candles of the same colour,
//exit when price gives back the last opposing candle's extreme
#[derive(Debug, Clone)]
pub struct TwoBullishCandlesStrategy {
    params: TwoBullishCandlesParams,
    settings: StrategySettings,
}

impl TwoBullishCandlesStrategy {
    pub fn new(params: TwoBullishCandlesParams) -> Self {
        TwoBullishCandlesStrategy {
            params,
            settings: StrategySettings {
                timeframe: "1d".to_string(),
                can_short: true,
                startup_candle_count: 2,
                stoploss: -0.5,
                minimal_roi: Vec::new(),
                trailing_stop: None,
            },
        }
    }
}

impl Default for TwoBullishCandlesStrategy {
    fn default() -> Self {
        Self::new(TwoBullishCandlesParams::default())
    }
}

impl Strategy for TwoBullishCandlesStrategy {
    fn name(&self) -> &str {
        "Two Bullish Candles"
    }

    fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    fn populate_indicators(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let runs = consecutive_candles(frame.candles());
        let extremes = previous_extremes(frame.candles());

        frame.insert_flags("bullish", runs.bullish)?;
        frame.insert_flags("bearish", runs.bearish)?;
        frame.insert_flags("two_consecutive_bullish", runs.two_bullish)?;
        frame.insert_flags("two_consecutive_bearish", runs.two_bearish)?;
        frame.insert_values("prev_bullish_low", extremes.prev_bullish_low)?;
        frame.insert_values("prev_bearish_high", extremes.prev_bearish_high)?;
        Ok(())
    }

    fn populate_entry_trend(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let two_bullish = frame.flags("two_consecutive_bullish")?.to_vec();
        let two_bearish = frame.flags("two_consecutive_bearish")?.to_vec();

        for i in 0..frame.len() {
            if two_bullish[i] {
                frame.signals.mark_enter_long(i, BULLISH_ENTRY_TAG);
            }
            if two_bearish[i] {
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
        let bullish_low = frame.values("prev_bullish_low")?.to_vec();
        let bearish_high = frame.values("prev_bearish_high")?.to_vec();

        //nan extremes compare false, so nothing exits before the first candle of each colour
        for i in 0..frame.len() {
            if close[i] <= bullish_low[i] {
                frame.signals.mark_exit_long(i, None);
            }
            if close[i] >= bearish_high[i] {
                frame.signals.mark_exit_short(i, None);
            }
        }
        Ok(())
    }

    fn leverage(&self, request: &LeverageRequest) -> f64 {
        request.clamp(self.params.leverage)
    }

    fn custom_exit_price(&self, frame: &Frame, trade: &TradeSnapshot, proposed_rate: f64) -> f64 {
        let column = match trade.side {
            TradeSide::Long => "prev_bullish_low",
            TradeSide::Short => "prev_bearish_high",
        };
        match frame.last_value(column) {
            Ok(Some(price)) => price,
            _ => proposed_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::candle::fixtures::candles;
    use crate::strategy::analyze;
    use chrono::{TimeZone, Utc};

    fn rows() -> Vec<(f64, f64, f64, f64)> {
        vec![
            (1.0, 2.0, 0.5, 2.0),
            (2.0, 2.5, 1.5, 2.4),
            (2.4, 2.6, 1.2, 1.4),
            (1.4, 1.5, 1.0, 1.1),
            (1.1, 2.8, 1.0, 2.7),
        ]
    }

    fn metadata() -> PairMetadata {
        PairMetadata::new("BTC/USDT", "1d")
    }

    fn trade(side: TradeSide) -> TradeSnapshot {
        TradeSnapshot {
            pair: "BTC/USDT".into(),
            side,
            open_rate: 2.0,
            current_rate: 2.0,
            current_profit: 0.0,
            open_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn entries_follow_two_candle_runs() {
        let frame = analyze(
            &TwoBullishCandlesStrategy::default(),
            candles(&rows()),
            &metadata(),
        )
        .unwrap();
        let s = &frame.signals;

        assert_eq!(s.enter_long, vec![false, true, false, false, false]);
        assert_eq!(s.enter_short, vec![false, false, false, true, false]);
        assert_eq!(s.enter_tag[1].as_deref(), Some(BULLISH_ENTRY_TAG));
        assert_eq!(s.enter_tag[3].as_deref(), Some(BEARISH_ENTRY_TAG));
    }

    #[test]
    fn exits_on_previous_extremes() {
        let frame = analyze(
            &TwoBullishCandlesStrategy::default(),
            candles(&rows()),
            &metadata(),
        )
        .unwrap();
        let s = &frame.signals;

        // previous bullish low is 1.5 from row 2 on
        assert_eq!(s.exit_long, vec![false, false, true, true, false]);
        // previous bearish high is 2.6 on row 3 and 1.5 on row 4
        assert_eq!(s.exit_short, vec![false, false, false, false, true]);
        assert!(s.exit_tag.iter().all(Option::is_none));
    }

    #[test]
    fn exit_price_uses_last_extreme() {
        let strategy = TwoBullishCandlesStrategy::default();
        let frame = analyze(&strategy, candles(&rows()), &metadata()).unwrap();

        assert_eq!(strategy.custom_exit_price(&frame, &trade(TradeSide::Long), 2.7), 1.5);
        assert_eq!(strategy.custom_exit_price(&frame, &trade(TradeSide::Short), 2.7), 1.5);

        let single = analyze(&strategy, candles(&rows()[..1]), &metadata()).unwrap();
        assert_eq!(strategy.custom_exit_price(&single, &trade(TradeSide::Long), 2.7), 2.7);
    }

    #[test]
    fn leverage_is_clamped() {
        let strategy = TwoBullishCandlesStrategy::default();
        let mut req = LeverageRequest {
            pair: "BTC/USDT".into(),
            current_rate: 2.0,
            proposed_leverage: 1.0,
            max_leverage: 125.0,
            side: TradeSide::Long,
        };
        assert_eq!(strategy.leverage(&req), 30.0);
        req.max_leverage = 10.0;
        assert_eq!(strategy.leverage(&req), 10.0);
    }
}
