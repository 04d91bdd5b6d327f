//column-wise indicator calculations
//every function takes whole series (oldest first) and returns a series of
//the same length. Rows without enough history hold f64::NAN instead of
//failing, following the TA-Lib conventions the strategies were tuned with

pub mod patterns;
pub mod range_filter;

use crate::data::Candle;

//shifts a series forward by periods rows, filling the head with NaN
pub fn shift(values: &[f64], periods: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if periods < values.len() {
        out[periods..].copy_from_slice(&values[..values.len() - periods]);
    }
    out
}

//exponential moving average with span period
//leading NaNs are skipped. The first output is the simple mean of the first
//period defined inputs, then ema = x * k + ema * (1 - k) with
//k = 2 / (period + 1)
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(start) => start,
        None => return out,
    };
    if values.len() - start < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed_end = start + period;
    let mut prev = values[start..seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = prev;

    for i in seed_end..values.len() {
        prev = values[i] * k + prev * (1.0 - k);
        out[i] = prev;
    }
    out
}

//true range per candle. The first candle has no previous close and is NaN
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let mut out = vec![f64::NAN; candles.len()];
    for i in 1..candles.len() {
        out[i] = candles[i].true_range(candles[i - 1].close);
    }
    out
}

//average true range with Wilder smoothing, seeded by the mean of the first
//period true ranges. First defined at index period
pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let tr = true_range(candles);
    let mut out = vec![f64::NAN; candles.len()];
    if period == 0 || candles.len() <= period {
        return out;
    }

    let n = period as f64;
    let mut prev = tr[1..=period].iter().sum::<f64>() / n;
    out[period] = prev;
    for i in period + 1..candles.len() {
        prev = (prev * (n - 1.0) + tr[i]) / n;
        out[i] = prev;
    }
    out
}

//relative strength index with Wilder smoothing. First defined at index
//period
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let n = period as f64;
    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period].iter().filter(|&&c| c > 0.0).sum::<f64>() / n;
    let mut avg_loss = changes[..period]
        .iter()
        .filter(|&&c| c < 0.0)
        .map(|c| -c)
        .sum::<f64>()
        / n;
    out[period] = rsi_value(avg_gain, avg_loss);

    for (offset, &change) in changes[period..].iter().enumerate() {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        out[period + 1 + offset] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        0.0
    } else {
        100.0 * avg_gain / total
    }
}

//MACD line, signal line and histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

//MACD with both averages aligned on the slow average's first row; all three
//outputs start once the signal line is defined
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let len = closes.len();
    let undefined = || Macd {
        macd: vec![f64::NAN; len],
        signal: vec![f64::NAN; len],
        hist: vec![f64::NAN; len],
    };
    if fast == 0 || fast >= slow || signal == 0 || len < slow {
        return undefined();
    }

    //seed the fast average on the window ending where the slow one starts
    let mut fast_input = closes.to_vec();
    fast_input[..slow - fast].fill(f64::NAN);
    let fast_ema = ema(&fast_input, fast);
    let slow_ema = ema(closes, slow);

    let mut line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);

    let first = slow - 1 + signal - 1;
    line[..first.min(len)].fill(f64::NAN);
    let hist = line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    Macd {
        macd: line,
        signal: signal_line,
        hist,
    }
}

//minimum over a trailing window; NaN until the window is full or when it
//contains NaN
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, f64::min)
}

//maximum over a trailing window; NaN until the window is full or when it
//contains NaN
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, f64::max)
}

fn rolling(values: &[f64], window: usize, pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        if w.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i + window - 1] = w.iter().copied().reduce(pick).unwrap_or(f64::NAN);
    }
    out
}
