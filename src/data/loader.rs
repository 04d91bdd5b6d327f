use crate::data::candle::Candle;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

//pair assigned to rows without a pair column
pub const DEFAULT_PAIR: &str = "UNKNOWN";

#[derive(Debug, Deserialize)]
struct CsvRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    pair: Option<String>,
}

//loads candles from a csv file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut candles = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .context(format!(
                "Failed to parse timestamp '{}' at line {}",
                record.timestamp,
                index + 2
            ))?
            .with_timezone(&Utc);

        let pair = record
            .pair
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PAIR.to_string());

        let candle = Candle::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
            pair,
        )
        .context(format!("Invalid candle at line {}", index + 2))?;
        candles.push(candle);
    }

    //the filter recurrence depends on chronological order
    candles.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    debug!(rows = candles.len(), path = ?path, "Loaded candles");
    Ok(candles)
}

//filters candles by pair
pub fn filter_by_pair(candles: &[Candle], pair: &str) -> Vec<Candle> {
    candles
        .iter()
        .filter(|candle| candle.pair == pair)
        .cloned()
        .collect()
}

//splits candles into one chronological sequence per pair, in first-seen order
pub fn group_by_pair(candles: Vec<Candle>) -> IndexMap<String, Vec<Candle>> {
    let mut groups: IndexMap<String, Vec<Candle>> = IndexMap::new();
    for candle in candles {
        groups.entry(candle.pair.clone()).or_default().push(candle);
    }
    groups
}
