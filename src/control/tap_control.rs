use serde::{Deserialize, Serialize};
use std::any::Any;
use strum::{Display, EnumString};

use super::{ControlError, Controller};
use crate::network::{ElementId, Network, NetworkRef, SharedNetwork, TableError};

/// Transformer side whose bus voltage is controlled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TapSide {
    Hv,
    #[default]
    Lv,
}

impl TapSide {
    fn bus_column(&self) -> &'static str {
        match self {
            TapSide::Hv => "hv_bus",
            TapSide::Lv => "lv_bus",
        }
    }
}

/// Continuous tap changer keeping one transformer side at a voltage set point
#[derive(Debug, Clone)]
pub struct ContinuousTapControl {
    net: NetworkRef,
    /// Controlled transformer
    pub tid: ElementId,
    pub vm_set_pu: f64,
    /// Accepted voltage deviation (p.u.)
    pub tol: f64,
    pub side: TapSide,
    pub check_tap_bounds: bool,
}

impl ContinuousTapControl {
    pub fn new(net: &SharedNetwork, tid: ElementId, vm_set_pu: f64) -> Result<Self, ControlError> {
        let trafos = net.read();
        if !trafos.table("trafo")?.data().contains(tid) {
            return Err(TableError::MissingElement {
                table: "trafo".to_string(),
                index: tid,
            }
            .into());
        }

        Ok(Self {
            net: net.downgrade(),
            tid,
            vm_set_pu,
            tol: 1e-3,
            side: TapSide::Lv,
            check_tap_bounds: true,
        })
    }

    pub fn with_side(mut self, side: TapSide) -> Self {
        self.side = side;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Bus on the controlled transformer side
    pub fn controlled_bus(&self, net: &Network) -> Result<ElementId, ControlError> {
        let trafos = net.table("trafo")?.data();
        Ok(trafos.row(self.tid)?.int(self.side.bus_column())?)
    }

    /// Tap range of the controlled transformer
    pub fn tap_bounds(&self, net: &Network) -> Result<(i64, i64), ControlError> {
        let row = net.table("trafo")?.data().row(self.tid)?;
        Ok((row.int("tap_min")?, row.int("tap_max")?))
    }

    pub fn is_converged(&self, vm_pu: f64) -> bool {
        (vm_pu - self.vm_set_pu).abs() < self.tol
    }
}

impl Controller for ContinuousTapControl {
    fn kind(&self) -> &'static str {
        "ContinuousTapControl"
    }

    fn network(&self) -> &NetworkRef {
        &self.net
    }

    fn set_network(&mut self, net: NetworkRef) {
        self.net = net;
    }

    fn box_clone(&self) -> Box<dyn Controller> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
