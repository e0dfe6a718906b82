use itertools::Itertools;
use std::any::Any;
use tracing::debug;

use super::{ControlError, Controller, ControllerOptions};
use crate::network::{ElementId, Network, NetworkRef, SharedNetwork, TableError};
use crate::timeseries::{DataSource, ProfileName};

/// Writes data-source profile values into one column of an element table
///
/// Element `element_index[i]` receives profile `profile_name[i]`, scaled by
/// `scale_factor`.
#[derive(Debug, Clone)]
pub struct ConstControl {
    net: NetworkRef,
    pub element: String,
    pub variable: String,
    pub element_index: Vec<ElementId>,
    pub profile_name: Vec<ProfileName>,
    pub data_source: Option<Box<dyn DataSource>>,
    pub scale_factor: f64,
}

impl ConstControl {
    pub fn new(
        net: &SharedNetwork,
        element: &str,
        variable: &str,
        element_index: Vec<ElementId>,
        profile_name: Vec<ProfileName>,
        data_source: Option<Box<dyn DataSource>>,
    ) -> Result<Self, ControlError> {
        {
            let guard = net.read();
            let table = guard.table(element)?.data();
            table.column_position(variable)?;
            if let Some(&missing) = element_index.iter().find(|&&i| !table.contains(i)) {
                return Err(TableError::MissingElement {
                    table: element.to_string(),
                    index: missing,
                }
                .into());
            }
        }

        if data_source.is_some() && profile_name.len() != element_index.len() {
            return Err(ControlError::ProfileMismatch {
                profiles: profile_name.len(),
                elements: element_index.len(),
            });
        }

        Ok(Self {
            net: net.downgrade(),
            element: element.to_string(),
            variable: variable.to_string(),
            element_index,
            profile_name,
            data_source,
            scale_factor: 1.0,
        })
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Scaled profile values for `time_step`, one per controlled element
    pub fn values_at(&self, time_step: usize) -> Result<Vec<f64>, ControlError> {
        let source = self
            .data_source
            .as_deref()
            .ok_or(ControlError::MissingDataSource)?;

        self.profile_name
            .iter()
            .map(|profile| {
                source
                    .time_step_value(time_step, profile)
                    .map(|v| v * self.scale_factor)
                    .map_err(ControlError::from)
            })
            .collect()
    }
}

impl Controller for ConstControl {
    fn kind(&self) -> &'static str {
        "ConstControl"
    }

    fn network(&self) -> &NetworkRef {
        &self.net
    }

    fn set_network(&mut self, net: NetworkRef) {
        self.net = net;
    }

    fn data_source(&self) -> Option<&dyn DataSource> {
        self.data_source.as_deref()
    }

    fn data_source_mut(&mut self) -> Option<&mut (dyn DataSource + 'static)> {
        self.data_source.as_deref_mut()
    }

    /// Const controls run before every other controller
    fn default_options(&self) -> ControllerOptions {
        ControllerOptions {
            order: -1.0,
            level: -1,
            recycle: true,
            ..ControllerOptions::default()
        }
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

/// Apply every in-service const control of `net` for `time_step`
///
/// Controls run by level, then order. Returns the number of controls applied.
pub fn run_const_controls(net: &mut Network, time_step: usize) -> Result<usize, ControlError> {
    let updates = net
        .controller
        .iter()
        .filter(|(_, row)| row.in_service)
        .sorted_by(|(_, a), (_, b)| a.level.cmp(&b.level).then(a.order.total_cmp(&b.order)))
        .filter_map(|(_, row)| row.object.as_any().downcast_ref::<ConstControl>())
        .filter(|control| control.data_source.is_some())
        .map(|control| {
            Ok((
                control.element.clone(),
                control.variable.clone(),
                control.element_index.clone(),
                control.values_at(time_step)?,
            ))
        })
        .collect::<Result<Vec<_>, ControlError>>()?;

    for (element, variable, indices, values) in &updates {
        let table = net.table_mut(element)?.data_mut();
        for (&index, &value) in indices.iter().zip(values) {
            table.set(index, variable, value)?;
        }
    }

    debug!(time_step, controls = updates.len(), "applied const controls");
    Ok(updates.len())
}
