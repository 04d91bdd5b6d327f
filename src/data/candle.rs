use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CandleError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//represents a single ohlcv candle for one trading pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub pair: String,
}

impl Candle {
    //creates a new candle with validation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        pair: String,
    ) -> Result<Self, CandleError> {
        if high < low {
            return Err(CandleError::InvalidHighLow { high, low });
        }

        if close < low || close > high {
            return Err(CandleError::InvalidClose { close, high, low });
        }

        if open < low || open > high {
            return Err(CandleError::InvalidOpen { open, high, low });
        }

        if volume < 0.0 {
            return Err(CandleError::NegativeVolume(volume));
        }

        Ok(Self::new_unchecked(
            timestamp, open, high, low, close, volume, pair,
        ))
    }

    //creates a candle without validation
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        pair: String,
    ) -> Self {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            pair,
        }
    }

    //true when the candle closed above its open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    //true when the candle closed below its open
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    //max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Candle;
    use chrono::{Duration, TimeZone, Utc};

    //builds candles five minutes apart from (open, high, low, close) tuples
    pub fn candles(rows: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| {
                Candle::new_unchecked(
                    start + Duration::minutes(5 * i as i64),
                    o,
                    h,
                    l,
                    c,
                    1.0,
                    "BTC/USDT".to_string(),
                )
            })
            .collect()
    }

    //flat candles where open = high = low = close
    pub fn from_closes(closes: &[f64]) -> Vec<Candle> {
        let rows: Vec<_> = closes.iter().map(|&c| (c, c, c, c)).collect();
        candles(&rows)
    }
}
