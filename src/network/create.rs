//! Element creation helpers
//!
//! Each helper appends one row to the matching element table and returns its
//! index. Referenced buses, lines and transformers must already exist.

use super::{DataTable, ElementId, Geometry, Network, Point, SwitchElement, TableError, Value};

const STANDARD_TABLES: [(&str, &[&str]); 10] = [
    ("bus", &["name", "vn_kv", "type", "zone", "in_service"]),
    ("load", &["name", "bus", "p_mw", "q_mvar", "scaling", "in_service"]),
    ("sgen", &["name", "bus", "p_mw", "q_mvar", "scaling", "in_service"]),
    ("gen", &["name", "bus", "p_mw", "vm_pu", "slack", "in_service"]),
    ("ext_grid", &["name", "bus", "vm_pu", "va_degree", "in_service"]),
    ("line", &["name", "std_type", "from_bus", "to_bus", "length_km", "in_service"]),
    (
        "trafo",
        &[
            "name", "std_type", "hv_bus", "lv_bus", "tap_pos", "tap_neutral", "tap_min", "tap_max",
            "in_service",
        ],
    ),
    ("switch", &["bus", "element", "et", "closed", "name"]),
    ("bus_geodata", &["x", "y", "coords"]),
    ("line_geodata", &["coords"]),
];

/// Network holding the standard, empty element tables
pub fn create_empty_network(name: &str, f_hz: f64, sn_mva: f64) -> Network {
    let mut net = Network::new(name, f_hz, sn_mva);
    for (table, columns) in STANDARD_TABLES {
        net.set_table(table, DataTable::with_columns(columns));
    }
    net
}

fn require(net: &Network, table: &str, index: ElementId) -> Result<(), TableError> {
    if net.table(table)?.data().contains(index) {
        Ok(())
    } else {
        Err(TableError::MissingElement {
            table: table.to_string(),
            index,
        })
    }
}

fn append<'a>(
    net: &mut Network,
    table: &str,
    cells: impl IntoIterator<Item = (&'a str, Value)>,
) -> Result<ElementId, TableError> {
    let data = net.table_mut(table)?.data_mut();
    let index = data.next_index();
    data.insert_row(index, cells)?;
    Ok(index)
}

pub fn create_bus(net: &mut Network, vn_kv: f64, name: &str) -> Result<ElementId, TableError> {
    append(
        net,
        "bus",
        [
            ("name", name.into()),
            ("vn_kv", vn_kv.into()),
            ("type", "b".into()),
            ("in_service", true.into()),
        ],
    )
}

pub fn create_ext_grid(
    net: &mut Network,
    bus: ElementId,
    vm_pu: f64,
    name: &str,
) -> Result<ElementId, TableError> {
    require(net, "bus", bus)?;
    append(
        net,
        "ext_grid",
        [
            ("name", name.into()),
            ("bus", bus.into()),
            ("vm_pu", vm_pu.into()),
            ("va_degree", 0.0.into()),
            ("in_service", true.into()),
        ],
    )
}

pub fn create_line(
    net: &mut Network,
    from_bus: ElementId,
    to_bus: ElementId,
    length_km: f64,
    std_type: &str,
    name: &str,
) -> Result<ElementId, TableError> {
    require(net, "bus", from_bus)?;
    require(net, "bus", to_bus)?;
    append(
        net,
        "line",
        [
            ("name", name.into()),
            ("std_type", std_type.into()),
            ("from_bus", from_bus.into()),
            ("to_bus", to_bus.into()),
            ("length_km", length_km.into()),
            ("in_service", true.into()),
        ],
    )
}

pub fn create_transformer(
    net: &mut Network,
    hv_bus: ElementId,
    lv_bus: ElementId,
    std_type: &str,
    name: &str,
) -> Result<ElementId, TableError> {
    require(net, "bus", hv_bus)?;
    require(net, "bus", lv_bus)?;
    append(
        net,
        "trafo",
        [
            ("name", name.into()),
            ("std_type", std_type.into()),
            ("hv_bus", hv_bus.into()),
            ("lv_bus", lv_bus.into()),
            ("tap_pos", 0.into()),
            ("tap_neutral", 0.into()),
            ("tap_min", (-9).into()),
            ("tap_max", 9.into()),
            ("in_service", true.into()),
        ],
    )
}

fn create_injection(
    net: &mut Network,
    table: &str,
    bus: ElementId,
    p_mw: f64,
    q_mvar: f64,
    name: &str,
) -> Result<ElementId, TableError> {
    require(net, "bus", bus)?;
    append(
        net,
        table,
        [
            ("name", name.into()),
            ("bus", bus.into()),
            ("p_mw", p_mw.into()),
            ("q_mvar", q_mvar.into()),
            ("scaling", 1.0.into()),
            ("in_service", true.into()),
        ],
    )
}

pub fn create_load(
    net: &mut Network,
    bus: ElementId,
    p_mw: f64,
    q_mvar: f64,
    name: &str,
) -> Result<ElementId, TableError> {
    create_injection(net, "load", bus, p_mw, q_mvar, name)
}

pub fn create_sgen(
    net: &mut Network,
    bus: ElementId,
    p_mw: f64,
    q_mvar: f64,
    name: &str,
) -> Result<ElementId, TableError> {
    create_injection(net, "sgen", bus, p_mw, q_mvar, name)
}

pub fn create_gen(
    net: &mut Network,
    bus: ElementId,
    p_mw: f64,
    vm_pu: f64,
    name: &str,
) -> Result<ElementId, TableError> {
    require(net, "bus", bus)?;
    append(
        net,
        "gen",
        [
            ("name", name.into()),
            ("bus", bus.into()),
            ("p_mw", p_mw.into()),
            ("vm_pu", vm_pu.into()),
            ("slack", false.into()),
            ("in_service", true.into()),
        ],
    )
}

pub fn create_switch(
    net: &mut Network,
    bus: ElementId,
    element: ElementId,
    et: SwitchElement,
    closed: bool,
    name: &str,
) -> Result<ElementId, TableError> {
    require(net, "bus", bus)?;
    require(net, et.table(), element)?;
    append(
        net,
        "switch",
        [
            ("bus", bus.into()),
            ("element", element.into()),
            ("et", et.to_string().into()),
            ("closed", closed.into()),
            ("name", name.into()),
        ],
    )
}

/// Set the planar position of a bus, keeping geo tables in sync
pub fn set_bus_geodata(net: &mut Network, bus: ElementId, x: f64, y: f64) -> Result<(), TableError> {
    require(net, "bus", bus)?;
    let table = net.table_mut("bus_geodata")?;
    let data = table.data_mut();
    if data.contains(bus) {
        data.set(bus, "x", x)?;
        data.set(bus, "y", y)?;
    } else {
        data.insert_row(bus, [("x", x.into()), ("y", y.into())])?;
    }

    if let Some(geo) = table.as_geo_mut() {
        geo.set_geometry(bus, Geometry::Point(Point::new(x, y)))?;
    }
    Ok(())
}

/// Set the course of a line, keeping geo tables in sync
pub fn set_line_geodata(
    net: &mut Network,
    line: ElementId,
    coords: Vec<[f64; 2]>,
) -> Result<(), TableError> {
    require(net, "line", line)?;
    let geometry = Geometry::LineString(coords.as_slice().into());
    let table = net.table_mut("line_geodata")?;
    let data = table.data_mut();
    if data.contains(line) {
        data.set(line, "coords", coords)?;
    } else {
        data.insert_row(line, [("coords", coords.into())])?;
    }

    if let Some(geo) = table.as_geo_mut() {
        geo.set_geometry(line, geometry)?;
    }
    Ok(())
}
