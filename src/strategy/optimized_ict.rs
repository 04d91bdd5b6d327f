use crate::config::OptimizedIctParams;
use crate::data::{Frame, PairMetadata};
use crate::indicators::patterns::{fair_value_gaps, swing_order_blocks};
use crate::indicators::{atr, ema, macd, rsi, shift};
use crate::strategy::{Strategy, StrategyError, StrategySettings, TradeSide, TradeSnapshot};
use tracing::debug;

pub const BULLISH_ENTRY_TAG: &str = "Optimized_Bullish_Entry";
pub const BEARISH_ENTRY_TAG: &str = "Optimized_Bearish_Entry";

//swing order blocks confirmed by trend, momentum and rsi extremes
//stops trail the last close by a multiple of atr
#[derive(Debug, Clone)]
pub struct OptimizedIctStrategy {
    params: OptimizedIctParams,
    settings: StrategySettings,
}

impl OptimizedIctStrategy {
    pub fn new(params: OptimizedIctParams) -> Self {
        OptimizedIctStrategy {
            params,
            settings: StrategySettings {
                timeframe: "5m".to_string(),
                can_short: true,
                startup_candle_count: 200,
                stoploss: -0.7,
                minimal_roi: Vec::new(),
                trailing_stop: None,
            },
        }
    }

    //trend average column, named after its period (ema200 by default)
    pub fn trend_column(&self) -> String {
        format!("ema{}", self.params.ema_period)
    }
}

impl Default for OptimizedIctStrategy {
    fn default() -> Self {
        Self::new(OptimizedIctParams::default())
    }
}

impl Strategy for OptimizedIctStrategy {
    fn name(&self) -> &str {
        "Optimized ICT"
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

        let trend = ema(&close, p.ema_period);
        let range = atr(frame.candles(), p.atr_period);
        let stop = range.iter().map(|a| a * p.atr_multiplier).collect();
        let strength = rsi(&close, p.rsi_period);
        let momentum = macd(&close, p.macd_fast, p.macd_slow, p.macd_signal);
        let blocks = swing_order_blocks(frame.candles(), p.order_block_window);
        let gaps = fair_value_gaps(frame.candles());

        frame.insert_values(&self.trend_column(), trend)?;
        frame.insert_values("atr", range)?;
        frame.insert_values("atr_stop", stop)?;
        frame.insert_values("rsi", strength)?;
        frame.insert_values("macd", momentum.macd)?;
        frame.insert_values("macdsignal", momentum.signal)?;
        frame.insert_values("macdhist", momentum.hist)?;
        frame.insert_flags("bullish_order_block", blocks.bullish)?;
        frame.insert_flags("bearish_order_block", blocks.bearish)?;
        frame.insert_flags("fvg", gaps.fvg)?;
        frame.insert_flags("ifvg", gaps.ifvg)?;

        debug!(pair = %metadata.pair, rows = frame.len(), "Optimized ICT indicators");
        Ok(())
    }

    fn populate_entry_trend(
        &self,
        frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        let p = &self.params;
        let close = frame.closes();
        let prev_close = shift(&close, 1);
        let trend = frame.values(&self.trend_column())?.to_vec();
        let strength = frame.values("rsi")?.to_vec();
        let line = frame.values("macd")?.to_vec();
        let signal = frame.values("macdsignal")?.to_vec();
        let bullish = frame.flags("bullish_order_block")?.to_vec();
        let bearish = frame.flags("bearish_order_block")?.to_vec();

        for i in 0..frame.len() {
            let long = bullish[i]
                && close[i] > trend[i]
                && strength[i] < p.rsi_long_below
                && line[i] > signal[i]
                && close[i] > prev_close[i];
            if long {
                frame.signals.mark_enter_long(i, BULLISH_ENTRY_TAG);
            }

            let short = bearish[i]
                && close[i] < trend[i]
                && strength[i] > p.rsi_short_above
                && line[i] < signal[i]
                && close[i] < prev_close[i];
            if short {
                frame.signals.mark_enter_short(i, BEARISH_ENTRY_TAG);
            }
        }
        Ok(())
    }

    //exits are left to the stoploss
    fn populate_exit_trend(
        &self,
        _frame: &mut Frame,
        _metadata: &PairMetadata,
    ) -> Result<(), StrategyError> {
        Ok(())
    }

    fn custom_stoploss(&self, frame: &Frame, trade: &TradeSnapshot) -> Option<f64> {
        let close = frame.candles().last()?.close;
        let offset = frame.last_value("atr_stop").ok()??;
        let rate = trade.current_rate;
        if rate <= 0.0 {
            return None;
        }

        let ratio = match trade.side {
            TradeSide::Long => ((close - offset - rate) / rate).min(0.0),
            TradeSide::Short => ((close + offset - rate) / rate).max(0.0),
        };
        Some(ratio)
    }
}
