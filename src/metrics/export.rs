use crate::data::Frame;
use crate::metrics::SignalEvent;
use anyhow::{Context, Result};
use std::path::PathBuf;

const CANDLE_FIELDS: [&str; 7] = ["timestamp", "pair", "open", "high", "low", "close", "volume"];
const SIGNAL_FIELDS: [&str; 6] = [
    "enter_long",
    "enter_short",
    "exit_long",
    "exit_short",
    "enter_tag",
    "exit_tag",
];

//writes every analyzed row: candle fields, indicator columns, then signals
//all pairs ran the same strategy, so the first frame's columns apply to all
pub fn write_frame_csv(frames: &[(String, Frame)], path: &PathBuf) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    let names: Vec<String> = frames
        .first()
        .map(|(_, f)| f.column_names().map(str::to_string).collect())
        .unwrap_or_default();

    let mut header: Vec<String> = CANDLE_FIELDS.iter().map(|s| s.to_string()).collect();
    header.extend(names.iter().cloned());
    header.extend(SIGNAL_FIELDS.iter().map(|s| s.to_string()));
    writer.write_record(&header)?;

    let flag = |b: bool| if b { "1" } else { "0" }.to_string();

    for (pair, frame) in frames {
        let s = &frame.signals;
        for (i, candle) in frame.candles().iter().enumerate() {
            let mut record = vec![
                candle.timestamp.to_rfc3339(),
                candle.pair.clone(),
                candle.open.to_string(),
                candle.high.to_string(),
                candle.low.to_string(),
                candle.close.to_string(),
                candle.volume.to_string(),
            ];
            for name in &names {
                let column = frame
                    .column(name)
                    .context(format!("Frame for {} lacks column {}", pair, name))?;
                record.push(column.cell(i));
            }
            record.push(flag(s.enter_long[i]));
            record.push(flag(s.enter_short[i]));
            record.push(flag(s.exit_long[i]));
            record.push(flag(s.exit_short[i]));
            record.push(s.enter_tag[i].clone().unwrap_or_default());
            record.push(s.exit_tag[i].clone().unwrap_or_default());
            writer.write_record(&record)?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn write_signals_csv(events: &[SignalEvent], path: &PathBuf) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;
    for event in events {
        writer.serialize(event)?;
    }
    writer.flush()?;
    Ok(())
}
