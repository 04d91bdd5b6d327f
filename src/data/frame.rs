use crate::data::candle::Candle;
use crate::indicators::range_filter::{Condition, Direction};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FrameError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Column '{name}' holds {actual} values, expected {expected}")]
    ColumnType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Column '{name}' has {len} rows but the frame has {rows}")]
    LengthMismatch { name: String, len: usize, rows: usize },
}

//identifies the trading pair a frame belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairMetadata {
    pub pair: String,
    pub timeframe: String,
}

impl PairMetadata {
    pub fn new(pair: impl Into<String>, timeframe: impl Into<String>) -> Self {
        PairMetadata {
            pair: pair.into(),
            timeframe: timeframe.into(),
        }
    }
}

//a derived column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Values(Vec<f64>),
    Flags(Vec<bool>),
    Directions(Vec<Direction>),
    Conditions(Vec<Condition>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Values(v) => v.len(),
            Column::Flags(v) => v.len(),
            Column::Directions(v) => v.len(),
            Column::Conditions(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Column::Values(_) => "numeric",
            Column::Flags(_) => "flag",
            Column::Directions(_) => "direction",
            Column::Conditions(_) => "condition",
        }
    }

    //renders one cell for csv output; undefined numbers render empty
    pub fn cell(&self, row: usize) -> String {
        match self {
            Column::Values(v) if v[row].is_nan() => String::new(),
            Column::Values(v) => v[row].to_string(),
            Column::Flags(v) => u8::from(v[row]).to_string(),
            Column::Directions(v) => v[row].signum().to_string(),
            Column::Conditions(v) => v[row].signum().to_string(),
        }
    }
}

//entry and exit flags set by a strategy, one entry per candle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals {
    pub enter_long: Vec<bool>,
    pub enter_short: Vec<bool>,
    pub exit_long: Vec<bool>,
    pub exit_short: Vec<bool>,
    pub enter_tag: Vec<Option<String>>,
    pub exit_tag: Vec<Option<String>>,
}

impl Signals {
    fn with_len(rows: usize) -> Self {
        Signals {
            enter_long: vec![false; rows],
            enter_short: vec![false; rows],
            exit_long: vec![false; rows],
            exit_short: vec![false; rows],
            enter_tag: vec![None; rows],
            exit_tag: vec![None; rows],
        }
    }

    pub fn mark_enter_long(&mut self, row: usize, tag: &str) {
        self.enter_long[row] = true;
        self.enter_tag[row] = Some(tag.to_string());
    }

    pub fn mark_enter_short(&mut self, row: usize, tag: &str) {
        self.enter_short[row] = true;
        self.enter_tag[row] = Some(tag.to_string());
    }

    pub fn mark_exit_long(&mut self, row: usize, tag: Option<&str>) {
        self.exit_long[row] = true;
        if let Some(tag) = tag {
            self.exit_tag[row] = Some(tag.to_string());
        }
    }

    pub fn mark_exit_short(&mut self, row: usize, tag: Option<&str>) {
        self.exit_short[row] = true;
        if let Some(tag) = tag {
            self.exit_tag[row] = Some(tag.to_string());
        }
    }
}

//candle sequence augmented with derived columns and signal flags
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    candles: Vec<Candle>,
    columns: IndexMap<String, Column>,
    pub signals: Signals,
}

impl Frame {
    pub fn new(candles: Vec<Candle>) -> Self {
        let rows = candles.len();
        Frame {
            candles,
            columns: IndexMap::new(),
            signals: Signals::with_len(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    //adds or replaces a column, keeping its original position on replace
    pub fn insert(&mut self, name: &str, column: Column) -> Result<(), FrameError> {
        if column.len() != self.len() {
            return Err(FrameError::LengthMismatch {
                name: name.to_string(),
                len: column.len(),
                rows: self.len(),
            });
        }
        self.columns.insert(name.to_string(), column);
        Ok(())
    }

    pub fn insert_values(&mut self, name: &str, values: Vec<f64>) -> Result<(), FrameError> {
        self.insert(name, Column::Values(values))
    }

    pub fn insert_flags(&mut self, name: &str, flags: Vec<bool>) -> Result<(), FrameError> {
        self.insert(name, Column::Flags(flags))
    }

    pub fn column(&self, name: &str) -> Result<&Column, FrameError> {
        self.columns
            .get(name)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self, name: &str) -> Result<&[f64], FrameError> {
        match self.column(name)? {
            Column::Values(v) => Ok(v),
            other => Err(type_error(name, "numeric", other)),
        }
    }

    pub fn flags(&self, name: &str) -> Result<&[bool], FrameError> {
        match self.column(name)? {
            Column::Flags(v) => Ok(v),
            other => Err(type_error(name, "flag", other)),
        }
    }

    pub fn directions(&self, name: &str) -> Result<&[Direction], FrameError> {
        match self.column(name)? {
            Column::Directions(v) => Ok(v),
            other => Err(type_error(name, "direction", other)),
        }
    }

    pub fn conditions(&self, name: &str) -> Result<&[Condition], FrameError> {
        match self.column(name)? {
            Column::Conditions(v) => Ok(v),
            other => Err(type_error(name, "condition", other)),
        }
    }

    //last value of a numeric column, if defined
    pub fn last_value(&self, name: &str) -> Result<Option<f64>, FrameError> {
        Ok(self
            .values(name)?
            .last()
            .copied()
            .filter(|v| !v.is_nan()))
    }
}

fn type_error(name: &str, expected: &'static str, actual: &Column) -> FrameError {
    FrameError::ColumnType {
        name: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}
