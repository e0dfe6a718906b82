use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ElementId, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown row: {0}")]
    UnknownRow(ElementId),

    #[error("Duplicate row index: {0}")]
    DuplicateIndex(ElementId),

    #[error("{table} {index} does not exist")]
    MissingElement { table: String, index: ElementId },

    #[error("Column {column} of row {index} holds {found}, expected {expected}")]
    WrongType {
        index: ElementId,
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Row {index} has {found} cells, expected {expected}")]
    RaggedRow {
        index: ElementId,
        expected: usize,
        found: usize,
    },
}

/// Column-labelled table with rows keyed by element index
///
/// Rows keep insertion order. Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDataTable")]
pub struct DataTable {
    columns: Vec<String>,
    rows: IndexMap<ElementId, Vec<Value>>,
}

/// Unchecked wire form of a [`DataTable`]
#[derive(Deserialize)]
struct RawDataTable {
    columns: Vec<String>,
    rows: IndexMap<ElementId, Vec<Value>>,
}

impl TryFrom<RawDataTable> for DataTable {
    type Error = TableError;

    fn try_from(raw: RawDataTable) -> Result<Self, Self::Error> {
        let expected = raw.columns.len();
        if let Some((&index, cells)) = raw.rows.iter().find(|(_, c)| c.len() != expected) {
            return Err(TableError::RaggedRow {
                index,
                expected,
                found: cells.len(),
            });
        }
        Ok(Self {
            columns: raw.columns,
            rows: raw.rows,
        })
    }
}

impl DataTable {
    pub fn with_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: IndexMap::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, index: ElementId) -> bool {
        self.rows.contains_key(&index)
    }

    /// Row indices in insertion order
    pub fn index(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.rows.keys().copied()
    }

    /// Index the next appended row should use
    pub fn next_index(&self) -> ElementId {
        self.rows.keys().max().map_or(0, |max| max + 1)
    }

    pub fn column_position(&self, column: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
    }

    /// Append a column, filling existing rows with `default`
    pub fn add_column(&mut self, column: &str, default: Value) {
        if self.columns.iter().any(|c| c == column) {
            return;
        }
        self.columns.push(column.to_string());
        for cells in self.rows.values_mut() {
            cells.push(default.clone());
        }
    }

    /// Insert a row; columns not named in `cells` are left null
    pub fn insert_row<'a>(
        &mut self,
        index: ElementId,
        cells: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<(), TableError> {
        if self.rows.contains_key(&index) {
            return Err(TableError::DuplicateIndex(index));
        }

        let mut row = vec![Value::Null; self.columns.len()];
        for (column, value) in cells {
            let position = self.column_position(column)?;
            row[position] = value;
        }
        self.rows.insert(index, row);
        Ok(())
    }

    /// Remove a row, keeping the order of the others
    pub fn remove_row(&mut self, index: ElementId) -> Result<Vec<Value>, TableError> {
        self.rows
            .shift_remove(&index)
            .ok_or(TableError::UnknownRow(index))
    }

    pub fn row(&self, index: ElementId) -> Result<Row<'_>, TableError> {
        let cells = self.rows.get(&index).ok_or(TableError::UnknownRow(index))?;
        Ok(Row {
            index,
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = (ElementId, Row<'_>)> + '_ {
        self.rows.iter().map(move |(&index, cells)| {
            (
                index,
                Row {
                    index,
                    columns: &self.columns,
                    cells,
                },
            )
        })
    }

    pub fn get(&self, index: ElementId, column: &str) -> Result<&Value, TableError> {
        let position = self.column_position(column)?;
        let cells = self.rows.get(&index).ok_or(TableError::UnknownRow(index))?;
        cells
            .get(position)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
    }

    pub fn get_mut(&mut self, index: ElementId, column: &str) -> Result<&mut Value, TableError> {
        let position = self.column_position(column)?;
        let cells = self
            .rows
            .get_mut(&index)
            .ok_or(TableError::UnknownRow(index))?;
        cells
            .get_mut(position)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
    }

    pub fn set(
        &mut self,
        index: ElementId,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<(), TableError> {
        *self.get_mut(index, column)? = value.into();
        Ok(())
    }

    /// All cells of one column, in row order
    pub fn column(&self, column: &str) -> Result<Vec<&Value>, TableError> {
        let position = self.column_position(column)?;
        self.rows
            .values()
            .map(|cells| {
                cells
                    .get(position)
                    .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
            })
            .collect()
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: ElementId,
    columns: &'a [String],
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn index(&self) -> ElementId {
        self.index
    }

    pub fn get(&self, column: &str) -> Result<&'a Value, TableError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|p| self.cells.get(p))
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
    }

    fn typed<T>(
        &self,
        column: &str,
        expected: &'static str,
        view: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, TableError> {
        let value = self.get(column)?;
        view(value).ok_or_else(|| TableError::WrongType {
            index: self.index,
            column: column.to_string(),
            expected,
            found: value.type_name(),
        })
    }

    pub fn int(&self, column: &str) -> Result<i64, TableError> {
        self.typed(column, "int", Value::as_int)
    }

    pub fn float(&self, column: &str) -> Result<f64, TableError> {
        self.typed(column, "float", Value::as_float)
    }

    pub fn boolean(&self, column: &str) -> Result<bool, TableError> {
        self.typed(column, "bool", Value::as_bool)
    }

    pub fn text(&self, column: &str) -> Result<&'a str, TableError> {
        self.typed(column, "text", Value::as_text)
    }

    pub fn coords(&self, column: &str) -> Result<&'a [[f64; 2]], TableError> {
        self.typed(column, "coords", Value::as_coords)
    }
}
