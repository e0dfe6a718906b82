use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::{ElementId, Network, NetworkRef, SharedNetwork};
use crate::control::ControllerTable;

/// A network graph that cannot be copied safely
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
    #[error("Controller {index} has a dangling network back-reference")]
    DanglingBackReference { index: ElementId },

    #[error("Controller {index} refers to a different network")]
    ForeignBackReference { index: ElementId },

    #[error("Controller {index} shares its data source with the copy")]
    SharedDataSource { index: ElementId },
}

/// Deep copies of networks that preserve identity relationships
///
/// The copy is built in three steps:
/// 1. check that every controller of the source points back at the source
/// 2. duplicate tables and controllers (controllers still point at the source)
/// 3. allocate the new root and rewrite every controller back-reference to it
///
/// The source stays read-locked for the whole copy, so concurrent writers
/// cannot tear the snapshot.
pub struct NetworkCloner;

impl NetworkCloner {
    pub fn clone_network(source: &SharedNetwork) -> Result<SharedNetwork, CloneError> {
        let snapshot = source.read();

        Self::check_back_references(source, &snapshot.controller)?;

        let duplicate = snapshot.duplicate_unrepaired();
        Self::check_data_sources(&snapshot.controller, &duplicate.controller)?;

        let copy = Arc::new_cyclic(|owner| {
            let mut net = duplicate;
            let repaired = repair_back_references(&mut net, &NetworkRef::from_weak(owner.clone()));
            debug!(
                network = %net.name,
                tables = net.tables().count(),
                controllers = repaired,
                "deep-copied network"
            );
            RwLock::new(net)
        });

        Ok(SharedNetwork::from_arc(copy))
    }

    fn check_back_references(
        source: &SharedNetwork,
        controllers: &ControllerTable,
    ) -> Result<(), CloneError> {
        for (index, row) in controllers.iter() {
            let back = row.object.network();
            if back.is_dangling() {
                return Err(CloneError::DanglingBackReference { index });
            }
            if !back.points_to(source) {
                return Err(CloneError::ForeignBackReference { index });
            }
        }
        Ok(())
    }

    /// Data sources and their buffers must not be reachable from both networks
    fn check_data_sources(
        source: &ControllerTable,
        copy: &ControllerTable,
    ) -> Result<(), CloneError> {
        for ((index, original), (_, duplicate)) in source.iter().zip(copy.iter()) {
            let (Some(a), Some(b)) = (original.object.data_source(), duplicate.object.data_source())
            else {
                continue;
            };

            if std::ptr::addr_eq(a, b) || std::ptr::eq(a.buffer(), b.buffer()) {
                return Err(CloneError::SharedDataSource { index });
            }
        }
        Ok(())
    }
}

/// Point every controller of `net` at `owner`; returns the number of
/// controllers rewritten
pub fn repair_back_references(net: &mut Network, owner: &NetworkRef) -> usize {
    let mut repaired = 0;
    for (_, row) in net.controller.iter_mut() {
        row.object.set_network(owner.clone());
        repaired += 1;
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{add_controller, ConstControl, ContinuousTapControl};
    use crate::networks::example_simple;
    use crate::timeseries::{Frame, FrameData, ProfileName};

    fn controlled() -> SharedNetwork {
        let net = example_simple().unwrap();
        let tap = ContinuousTapControl::new(&net, 0, 1.0).unwrap();
        add_controller(&net, tap).unwrap();

        let ds = FrameData::new(Frame::from_rows(vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap());
        let load = ConstControl::new(&net, "load", "p_mw", vec![0], vec![ProfileName::Index(0)], Some(Box::new(ds))).unwrap();
        add_controller(&net, load).unwrap();
        net
    }

    #[test]
    fn test_copy_points_at_itself() {
        let net = controlled();
        let copy = NetworkCloner::clone_network(&net).unwrap();

        assert!(!copy.ptr_eq(&net));
        for (_, row) in copy.read().controller.iter() {
            assert!(row.object.network().points_to(&copy));
            assert!(!row.object.network().points_to(&net));
        }
    }

    #[test]
    fn test_source_unchanged() {
        let net = controlled();
        let before = format!("{:?}", *net.read());
        let _copy = net.deep_copy().unwrap();
        assert_eq!(format!("{:?}", *net.read()), before);
    }

    #[test]
    fn test_foreign_back_reference_rejected() {
        let net = controlled();
        let other = example_simple().unwrap();
        net.write()
            .controller
            .get_mut(0)
            .unwrap()
            .object
            .set_network(other.downgrade());

        assert_eq!(
            net.deep_copy().unwrap_err(),
            CloneError::ForeignBackReference { index: 0 }
        );
    }

    #[test]
    fn test_dangling_back_reference_rejected() {
        let net = controlled();
        net.write()
            .controller
            .get_mut(1)
            .unwrap()
            .object
            .set_network(NetworkRef::default());

        assert_eq!(
            net.deep_copy().unwrap_err(),
            CloneError::DanglingBackReference { index: 1 }
        );
    }

    #[test]
    fn test_repair_counts_controllers() {
        let net = controlled();
        let mut detached = net.read().duplicate_unrepaired();
        assert_eq!(repair_back_references(&mut detached, &NetworkRef::default()), 2);
        assert!(detached
            .controller
            .iter()
            .all(|(_, row)| row.object.network().is_dangling()));
    }
}
