use serde::Serialize;

use super::{ElementId, SharedNetwork, TableKind};

/// Serializable overview of a network
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    pub name: String,
    pub f_hz: f64,
    pub sn_mva: f64,
    pub tables: Vec<TableSummary>,
    pub controllers: Vec<ControllerSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub kind: TableKind,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerSummary {
    pub index: ElementId,
    pub kind: &'static str,
    pub in_service: bool,
    pub order: f64,
    pub level: i64,
    pub has_data_source: bool,
    /// Back-reference points at the summarized network
    pub owned_by_network: bool,
}

impl NetworkSummary {
    pub fn of(shared: &SharedNetwork) -> Self {
        let net = shared.read();

        let tables = net
            .tables()
            .map(|(name, table)| TableSummary {
                name: name.to_string(),
                kind: table.kind(),
                rows: table.data().len(),
            })
            .collect();

        let controllers = net
            .controller
            .iter()
            .map(|(index, row)| ControllerSummary {
                index,
                kind: row.object.kind(),
                in_service: row.in_service,
                order: row.order,
                level: row.level,
                has_data_source: row.object.data_source().is_some(),
                owned_by_network: row.object.network().points_to(shared),
            })
            .collect();

        Self {
            name: net.name.clone(),
            f_hz: net.f_hz,
            sn_mva: net.sn_mva,
            tables,
            controllers,
        }
    }
}
