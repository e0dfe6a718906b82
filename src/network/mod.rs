//! Network data model
//!
//! A [`Network`] is a set of named element tables plus a controller table.
//! Controllers point back at their network through a non-owning
//! [`NetworkRef`]; [`NetworkCloner`] copies a network and rewrites those
//! back-references so they point at the copy.

pub mod clone;
pub mod create;
pub mod geo;
pub mod model;
pub mod summary;
pub mod table;
pub mod value;

pub use clone::{CloneError, NetworkCloner};
pub use create::*;
pub use geo::{GeoTable, Geometry, GeometryKind, LineString, Point};
pub use model::{Network, NetworkRef, SharedNetwork};
pub use summary::NetworkSummary;
pub use table::{DataTable, Row, TableError};
pub use value::Value;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Stable external identifier of a network element (row index)
pub type ElementId = i64;

/// A network table: plain rows, or rows with a geometry payload
///
/// Copies dispatch on the variant, so a geo table stays a geo table and its
/// geometries keep their kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Plain(DataTable),
    Geo(GeoTable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TableKind {
    Plain,
    Geo,
}

impl Table {
    pub fn kind(&self) -> TableKind {
        match self {
            Table::Plain(_) => TableKind::Plain,
            Table::Geo(_) => TableKind::Geo,
        }
    }

    /// Row data, whatever the variant
    pub fn data(&self) -> &DataTable {
        match self {
            Table::Plain(t) => t,
            Table::Geo(g) => g.data(),
        }
    }

    pub fn data_mut(&mut self) -> &mut DataTable {
        match self {
            Table::Plain(t) => t,
            Table::Geo(g) => g.data_mut(),
        }
    }

    pub fn as_geo(&self) -> Option<&GeoTable> {
        match self {
            Table::Geo(g) => Some(g),
            Table::Plain(_) => None,
        }
    }

    pub fn as_geo_mut(&mut self) -> Option<&mut GeoTable> {
        match self {
            Table::Geo(g) => Some(g),
            Table::Plain(_) => None,
        }
    }

    /// Independent copy that keeps the variant
    pub fn duplicate(&self) -> Table {
        match self {
            Table::Plain(t) => Table::Plain(t.clone()),
            Table::Geo(g) => Table::Geo(g.clone()),
        }
    }
}

impl From<DataTable> for Table {
    fn from(t: DataTable) -> Self {
        Table::Plain(t)
    }
}

impl From<GeoTable> for Table {
    fn from(g: GeoTable) -> Self {
        Table::Geo(g)
    }
}

/// What the `element` column of a switch refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, strum::Display)]
pub enum SwitchElement {
    #[strum(serialize = "b")]
    #[serde(rename = "b")]
    Bus,
    #[strum(serialize = "l")]
    #[serde(rename = "l")]
    Line,
    #[strum(serialize = "t")]
    #[serde(rename = "t")]
    Trafo,
}

impl SwitchElement {
    /// Table holding the switched element
    pub fn table(&self) -> &'static str {
        match self {
            SwitchElement::Bus => "bus",
            SwitchElement::Line => "line",
            SwitchElement::Trafo => "trafo",
        }
    }
}
