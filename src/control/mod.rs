//! Controllers attached to a network
//!
//! The network owns its controllers through the [`ControllerTable`]; each
//! controller keeps a non-owning [`NetworkRef`] back to that network.

pub mod const_control;
pub mod tap_control;

pub use const_control::{run_const_controls, ConstControl};
pub use tap_control::{ContinuousTapControl, TapSide};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::network::{ElementId, NetworkRef, SharedNetwork, TableError};
use crate::timeseries::{DataSource, DataSourceError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("Controller refers to a different network")]
    ForeignNetwork,

    #[error("{profiles} profile names given for {elements} elements")]
    ProfileMismatch { profiles: usize, elements: usize },

    #[error("Controller has no data source")]
    MissingDataSource,

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

/// A control algorithm attached to a network
///
/// Implementations hold the back-reference handed to their constructor and
/// return it from [`Controller::network`]. `box_clone` must duplicate any data
/// source with its own buffer; the back-reference of the clone may still point
/// at the old network, network copies rewrite it through `set_network`.
pub trait Controller: fmt::Debug + Send + Sync + 'static {
    /// Type name shown in summaries
    fn kind(&self) -> &'static str;

    fn network(&self) -> &NetworkRef;

    fn set_network(&mut self, net: NetworkRef);

    fn data_source(&self) -> Option<&dyn DataSource> {
        None
    }

    fn data_source_mut(&mut self) -> Option<&mut (dyn DataSource + 'static)> {
        None
    }

    /// Table options used by [`add_controller`]
    fn default_options(&self) -> ControllerOptions {
        ControllerOptions::default()
    }

    fn box_clone(&self) -> Box<dyn Controller>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Scheduling columns of a controller row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerOptions {
    pub in_service: bool,
    pub order: f64,
    pub level: i64,
    pub initial_run: bool,
    pub recycle: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            in_service: true,
            order: 0.0,
            level: 0,
            initial_run: false,
            recycle: false,
        }
    }
}

#[derive(Debug)]
pub struct ControllerRow {
    pub object: Box<dyn Controller>,
    pub in_service: bool,
    pub order: f64,
    pub level: i64,
    pub initial_run: bool,
    pub recycle: bool,
}

impl ControllerRow {
    pub fn new(object: Box<dyn Controller>, options: ControllerOptions) -> Self {
        Self {
            object,
            in_service: options.in_service,
            order: options.order,
            level: options.level,
            initial_run: options.initial_run,
            recycle: options.recycle,
        }
    }

    pub fn options(&self) -> ControllerOptions {
        ControllerOptions {
            in_service: self.in_service,
            order: self.order,
            level: self.level,
            initial_run: self.initial_run,
            recycle: self.recycle,
        }
    }
}

/// The controller table of a network, keyed by controller index
#[derive(Debug, Default)]
pub struct ControllerTable {
    rows: IndexMap<ElementId, ControllerRow>,
}

impl ControllerTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row and return its index
    pub fn insert(&mut self, row: ControllerRow) -> ElementId {
        let index = self.rows.keys().max().map_or(0, |max| max + 1);
        self.rows.insert(index, row);
        index
    }

    pub fn get(&self, index: ElementId) -> Option<&ControllerRow> {
        self.rows.get(&index)
    }

    pub fn get_mut(&mut self, index: ElementId) -> Option<&mut ControllerRow> {
        self.rows.get_mut(&index)
    }

    pub fn remove(&mut self, index: ElementId) -> Option<ControllerRow> {
        self.rows.shift_remove(&index)
    }

    /// Controller object at `index`, downcast to its concrete type
    pub fn object_as<T: Controller>(&self, index: ElementId) -> Option<&T> {
        self.get(index)?.object.as_any().downcast_ref::<T>()
    }

    pub fn object_as_mut<T: Controller>(&mut self, index: ElementId) -> Option<&mut T> {
        self.get_mut(index)?.object.as_any_mut().downcast_mut::<T>()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &ControllerRow)> + '_ {
        self.rows.iter().map(|(&index, row)| (index, row))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ElementId, &mut ControllerRow)> + '_ {
        self.rows.iter_mut().map(|(&index, row)| (index, row))
    }

    /// Copy of every row; back-references are copied as they are
    pub(crate) fn duplicate_unrepaired(&self) -> ControllerTable {
        let rows = self
            .rows
            .iter()
            .map(|(&index, row)| (index, ControllerRow::new(row.object.box_clone(), row.options())))
            .collect();
        ControllerTable { rows }
    }
}

/// Register `controller` on `net` with its default options
pub fn add_controller(
    net: &SharedNetwork,
    controller: impl Controller,
) -> Result<ElementId, ControlError> {
    let options = controller.default_options();
    add_controller_with(net, controller, options)
}

/// Register `controller` on `net`; its back-reference must point at `net`
pub fn add_controller_with(
    net: &SharedNetwork,
    controller: impl Controller,
    options: ControllerOptions,
) -> Result<ElementId, ControlError> {
    if !controller.network().points_to(net) {
        return Err(ControlError::ForeignNetwork);
    }

    let kind = controller.kind();
    let index = net
        .write()
        .controller
        .insert(ControllerRow::new(Box::new(controller), options));
    debug!(index, kind, "added controller");
    Ok(index)
}
