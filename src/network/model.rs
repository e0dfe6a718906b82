use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::{Arc, Weak};

use super::{CloneError, GeoTable, Geometry, NetworkCloner, NetworkSummary, Table, TableError};
use crate::control::ControllerTable;

/// Root of the network object graph
///
/// Owns its element tables and its controllers. Controllers refer back to the
/// network through [`NetworkRef`], which never keeps it alive.
#[derive(Debug)]
pub struct Network {
    pub name: String,

    /// System frequency (Hz)
    pub f_hz: f64,

    /// Reference apparent power (MVA)
    pub sn_mva: f64,

    tables: IndexMap<String, Table>,

    pub controller: ControllerTable,
}

impl Network {
    /// Network without any tables; see `create_empty_network` for the
    /// standard element tables
    pub fn new(name: impl Into<String>, f_hz: f64, sn_mva: f64) -> Self {
        Self {
            name: name.into(),
            f_hz,
            sn_mva,
            tables: IndexMap::new(),
            controller: ControllerTable::default(),
        }
    }

    pub fn table(&self, name: &str) -> Result<&Table, TableError> {
        self.tables
            .get(name)
            .ok_or_else(|| TableError::UnknownTable(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table, TableError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| TableError::UnknownTable(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Tables in insertion order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> + '_ {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Add a table, or replace one in place keeping its position
    pub fn set_table(&mut self, name: impl Into<String>, table: impl Into<Table>) -> Option<Table> {
        self.tables.insert(name.into(), table.into())
    }

    /// Turn `bus_geodata` into a geo table of points and `line_geodata` into a
    /// geo table of line strings
    pub fn attach_geometries(&mut self, crs: Option<&str>) -> Result<(), TableError> {
        let conversions: [(&str, fn(&super::Row<'_>) -> Result<Geometry, TableError>); 2] = [
            ("bus_geodata", Geometry::point_from_xy),
            ("line_geodata", Geometry::line_from_coords),
        ];

        for (name, build) in conversions {
            let data = self.table(name)?.data().clone();
            let mut geo = GeoTable::from_table(data, build)?;
            if let Some(crs) = crs {
                geo = geo.with_crs(crs);
            }
            self.set_table(name, geo);
        }
        Ok(())
    }

    /// Independent copy of the tables and controllers
    ///
    /// Controller back-references still point at `self`; callers must repair
    /// them before the copy is used.
    pub(crate) fn duplicate_unrepaired(&self) -> Network {
        Network {
            name: self.name.clone(),
            f_hz: self.f_hz,
            sn_mva: self.sn_mva,
            tables: self
                .tables
                .iter()
                .map(|(name, table)| (name.clone(), table.duplicate()))
                .collect(),
            controller: self.controller.duplicate_unrepaired(),
        }
    }
}

/// Shared, lockable handle to a network
///
/// Cloning the handle shares the network. Use [`SharedNetwork::deep_copy`] for
/// an independent network.
#[derive(Clone)]
pub struct SharedNetwork(Arc<RwLock<Network>>);

impl SharedNetwork {
    pub fn new(net: Network) -> Self {
        Self(Arc::new(RwLock::new(net)))
    }

    pub(crate) fn from_arc(inner: Arc<RwLock<Network>>) -> Self {
        Self(inner)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Network> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Network> {
        self.0.write()
    }

    /// Non-owning back-reference to this network
    pub fn downgrade(&self) -> NetworkRef {
        NetworkRef(Arc::downgrade(&self.0))
    }

    /// True when both handles share one network
    pub fn ptr_eq(&self, other: &SharedNetwork) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Independent copy whose controllers point at the copy
    pub fn deep_copy(&self) -> Result<SharedNetwork, CloneError> {
        NetworkCloner::clone_network(self)
    }

    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary::of(self)
    }
}

impl fmt::Debug for SharedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedNetwork({:p})", Arc::as_ptr(&self.0))
    }
}

/// Non-owning reference from a controller to its network
#[derive(Clone, Default)]
pub struct NetworkRef(Weak<RwLock<Network>>);

impl NetworkRef {
    pub(crate) fn from_weak(inner: Weak<RwLock<Network>>) -> Self {
        Self(inner)
    }

    pub fn upgrade(&self) -> Option<SharedNetwork> {
        self.0.upgrade().map(SharedNetwork)
    }

    /// True when this reference targets `net`
    pub fn points_to(&self, net: &SharedNetwork) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&net.0))
    }

    /// True when the network is gone (or the reference was never set)
    pub fn is_dangling(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl fmt::Debug for NetworkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkRef({:p})", self.0.as_ptr())
    }
}
