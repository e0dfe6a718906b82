use serde::{Deserialize, Serialize};
use std::fmt;

use super::DataSourceError;

/// Column selector of a [`Frame`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileName {
    /// Column position
    Index(usize),
    /// Column label
    Label(String),
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileName::Index(i) => write!(f, "{}", i),
            ProfileName::Label(s) => write!(f, "{}", s),
        }
    }
}

impl From<usize> for ProfileName {
    fn from(i: usize) -> Self {
        ProfileName::Index(i)
    }
}

impl From<&str> for ProfileName {
    fn from(s: &str) -> Self {
        ProfileName::Label(s.to_string())
    }
}

/// Rectangular, row-major buffer of profile values; one row per time step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

/// Unchecked wire form of a [`Frame`]
#[derive(Deserialize)]
struct RawFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TryFrom<RawFrame> for Frame {
    type Error = DataSourceError;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        Frame::with_columns(raw.columns, raw.rows)
    }
}

impl Frame {
    /// Frame with columns labelled `"0"`, `"1"`, ...
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DataSourceError> {
        let width = rows.first().map_or(0, Vec::len);
        let columns = (0..width).map(|i| i.to_string()).collect();
        Self::with_columns(columns, rows)
    }

    pub fn with_columns(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DataSourceError> {
        let expected = columns.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(DataSourceError::RaggedRows {
                row,
                expected,
                found: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Number of time steps
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn column_position(&self, profile: &ProfileName) -> Result<usize, DataSourceError> {
        match profile {
            ProfileName::Index(i) if *i < self.width() => Ok(*i),
            ProfileName::Label(label) => self
                .columns
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| DataSourceError::UnknownProfile(label.clone())),
            other => Err(DataSourceError::UnknownProfile(other.to_string())),
        }
    }

    pub fn get(&self, time_step: usize, profile: &ProfileName) -> Result<f64, DataSourceError> {
        let column = self.column_position(profile)?;
        let row = self
            .rows
            .get(time_step)
            .ok_or(DataSourceError::TimeStepOutOfRange {
                time_step,
                len: self.len(),
            })?;
        row.get(column)
            .copied()
            .ok_or_else(|| DataSourceError::UnknownProfile(profile.to_string()))
    }

    pub fn set(
        &mut self,
        time_step: usize,
        profile: &ProfileName,
        value: f64,
    ) -> Result<(), DataSourceError> {
        let column = self.column_position(profile)?;
        let len = self.len();
        let row = self
            .rows
            .get_mut(time_step)
            .ok_or(DataSourceError::TimeStepOutOfRange { time_step, len })?;
        let cell = row
            .get_mut(column)
            .ok_or_else(|| DataSourceError::UnknownProfile(profile.to_string()))?;
        *cell = value;
        Ok(())
    }
}
