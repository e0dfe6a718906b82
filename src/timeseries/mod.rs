//! Time-series data sources feeding controllers

pub mod data_source;
pub mod frame;

pub use data_source::{DataSource, FrameData};
pub use frame::{Frame, ProfileName};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    #[error("Time step {time_step} outside data source of {len} steps")]
    TimeStepOutOfRange { time_step: usize, len: usize },

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}
