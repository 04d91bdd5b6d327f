//candle pattern detectors over short fixed lookbacks
//each detector is a pure function of the candles; a row whose lookback
//reaches before the first candle is false

use crate::data::Candle;
use crate::indicators::{rolling_max, rolling_min, shift};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBlocks {
    pub bullish: Vec<bool>,
    pub bearish: Vec<bool>,
}

//gap-style order blocks: the last window lows all sit above the previous
//high, and the same held one candle earlier. Bearish blocks mirror this with
//highs below the previous low
pub fn order_blocks(candles: &[Candle], window: usize) -> OrderBlocks {
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();

    let min_low = rolling_min(&lows, window);
    let max_high = rolling_max(&highs, window);
    let prev_min_low = rolling_min(&shift(&lows, 1), window);
    let prev_max_high = rolling_max(&shift(&highs, 1), window);
    let high_1 = shift(&highs, 1);
    let high_2 = shift(&highs, 2);
    let low_1 = shift(&lows, 1);
    let low_2 = shift(&lows, 2);

    let bullish = (0..candles.len())
        .map(|i| min_low[i] > high_1[i] && prev_min_low[i] > high_2[i])
        .collect();
    let bearish = (0..candles.len())
        .map(|i| max_high[i] < low_1[i] && prev_max_high[i] < low_2[i])
        .collect();

    OrderBlocks { bullish, bearish }
}

//swing order blocks: a green candle that sweeps the lowest low of the
//previous window candles and closes at or above the previous open
//bearish blocks are red candles sweeping the highest high and closing at or
//below the previous open
pub fn swing_order_blocks(candles: &[Candle], window: usize) -> OrderBlocks {
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let opens: Vec<f64> = candles.iter().map(|c| c.open).collect();

    let prior_min = shift(&rolling_min(&lows, window), 1);
    let prior_max = shift(&rolling_max(&highs, window), 1);
    let open_1 = shift(&opens, 1);

    let bullish = candles
        .iter()
        .enumerate()
        .map(|(i, c)| c.is_bullish() && c.low <= prior_min[i] && c.close >= open_1[i])
        .collect();
    let bearish = candles
        .iter()
        .enumerate()
        .map(|(i, c)| c.is_bearish() && c.high >= prior_max[i] && c.close <= open_1[i])
        .collect();

    OrderBlocks { bullish, bearish }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FairValueGaps {
    pub fvg: Vec<bool>,
    pub ifvg: Vec<bool>,
}

//fair value gap: the candle two back has its low above the previous high,
//and the current low trades back below that candle's high. The inner gap
//applies the same test one candle closer
pub fn fair_value_gaps(candles: &[Candle]) -> FairValueGaps {
    let mut fvg = vec![false; candles.len()];
    let mut ifvg = vec![false; candles.len()];

    for i in 1..candles.len() {
        let (prev, curr) = (&candles[i - 1], &candles[i]);
        ifvg[i] = prev.low > curr.high && curr.low < prev.high;

        if i >= 2 {
            let two_back = &candles[i - 2];
            fvg[i] = two_back.low > prev.high && curr.low < two_back.high;
        }
    }

    FairValueGaps { fvg, ifvg }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandleRuns {
    pub bullish: Vec<bool>,
    pub bearish: Vec<bool>,
    pub two_bullish: Vec<bool>,
    pub two_bearish: Vec<bool>,
}

//bullish/bearish candles and two-in-a-row runs of each
pub fn consecutive_candles(candles: &[Candle]) -> CandleRuns {
    let bullish: Vec<bool> = candles.iter().map(Candle::is_bullish).collect();
    let bearish: Vec<bool> = candles.iter().map(Candle::is_bearish).collect();
    let pairs = |flags: &[bool]| -> Vec<bool> {
        (0..flags.len())
            .map(|i| i > 0 && flags[i] && flags[i - 1])
            .collect()
    };

    CandleRuns {
        two_bullish: pairs(&bullish),
        two_bearish: pairs(&bearish),
        bullish,
        bearish,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviousExtremes {
    pub prev_bullish_low: Vec<f64>,
    pub prev_bearish_high: Vec<f64>,
}

//low of the most recent bullish candle and high of the most recent bearish
//candle strictly before each row; NaN until such a candle exists
pub fn previous_extremes(candles: &[Candle]) -> PreviousExtremes {
    let mut prev_bullish_low = vec![f64::NAN; candles.len()];
    let mut prev_bearish_high = vec![f64::NAN; candles.len()];
    let (mut low, mut high) = (f64::NAN, f64::NAN);

    for (i, candle) in candles.iter().enumerate() {
        prev_bullish_low[i] = low;
        prev_bearish_high[i] = high;
        if candle.is_bullish() {
            low = candle.low;
        }
        if candle.is_bearish() {
            high = candle.high;
        }
    }

    PreviousExtremes {
        prev_bullish_low,
        prev_bearish_high,
    }
}
