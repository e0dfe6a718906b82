//! Identifier ↔ position lookups with support for fused elements

pub mod fusion;
pub mod resolve;
pub mod table;

pub use fusion::bus_lookup;
pub use resolve::get_indices;
pub use table::{LookupTable, Position};

use thiserror::Error;

use crate::network::{ElementId, TableError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Identifier {0} not found in lookup")]
    UnknownIdentifier(String),

    #[error("Position {position} outside lookup of {len} elements")]
    PositionOutOfRange { position: i64, len: usize },

    #[error("Identifier {0} appears more than once")]
    DuplicateIdentifier(String),

    #[error("Switch {index} has a malformed bus, element, et or closed cell")]
    MalformedSwitch { index: ElementId },

    #[error(transparent)]
    Table(#[from] TableError),
}
