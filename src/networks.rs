//! Sample networks

use crate::network::{
    create_bus, create_empty_network, create_ext_grid, create_gen, create_line, create_load,
    create_sgen, create_switch, create_transformer, set_bus_geodata, set_line_geodata, Network,
    SharedNetwork, SwitchElement, TableError,
};

/// Seven-bus HV/MV network
///
/// An external grid feeds a 110 kV line; a 110/20 kV transformer sits between
/// two closed bus couplers, and two MV lines with line switches lead to a
/// load, a static generator and a generator.
pub fn example_simple() -> Result<SharedNetwork, TableError> {
    Ok(SharedNetwork::new(example_simple_network("example_simple", 50.0, 1.0)?))
}

pub fn example_simple_network(name: &str, f_hz: f64, sn_mva: f64) -> Result<Network, TableError> {
    let mut net = create_empty_network(name, f_hz, sn_mva);

    let hv_busbar = create_bus(&mut net, 110.0, "HV Busbar")?;
    let hv_busbar_2 = create_bus(&mut net, 110.0, "HV Busbar 2")?;
    let hv_trafo_bus = create_bus(&mut net, 110.0, "HV Transformer Bus")?;
    let mv_trafo_bus = create_bus(&mut net, 20.0, "MV Transformer Bus")?;
    let mv_main_bus = create_bus(&mut net, 20.0, "MV Main Bus")?;
    let mv_bus_1 = create_bus(&mut net, 20.0, "MV Bus 1")?;
    let mv_bus_2 = create_bus(&mut net, 20.0, "MV Bus 2")?;

    create_ext_grid(&mut net, hv_busbar, 1.02, "Grid Connection")?;

    let hv_line = create_line(&mut net, hv_busbar, hv_busbar_2, 10.0, "149-AL1/24-ST1A 110.0", "HV Line")?;
    create_switch(&mut net, hv_busbar_2, hv_trafo_bus, SwitchElement::Bus, true, "HV Coupler")?;

    create_transformer(&mut net, hv_trafo_bus, mv_trafo_bus, "25 MVA 110/20 kV", "Trafo")?;
    create_switch(&mut net, mv_trafo_bus, mv_main_bus, SwitchElement::Bus, true, "MV Coupler")?;

    let mv_cable = "NA2XS2Y 1x185 RM/25 12/20 kV";
    let mv_line_1 = create_line(&mut net, mv_main_bus, mv_bus_1, 1.5, mv_cable, "MV Line1")?;
    let mv_line_2 = create_line(&mut net, mv_bus_1, mv_bus_2, 1.5, mv_cable, "MV Line2")?;
    create_switch(&mut net, mv_main_bus, mv_line_1, SwitchElement::Line, true, "Line Switch 1")?;
    create_switch(&mut net, mv_bus_2, mv_line_2, SwitchElement::Line, true, "Line Switch 2")?;

    create_load(&mut net, mv_bus_2, 2.0, 4.0, "load")?;
    create_sgen(&mut net, mv_bus_2, 2.0, -0.5, "static generator")?;
    create_gen(&mut net, mv_bus_1, 6.0, 1.03, "generator")?;

    let positions = [
        (hv_busbar, 0.0, 0.0),
        (hv_busbar_2, 0.0, -1.0),
        (hv_trafo_bus, 0.0, -1.5),
        (mv_trafo_bus, 0.0, -2.0),
        (mv_main_bus, 0.0, -2.5),
        (mv_bus_1, 1.0, -3.0),
        (mv_bus_2, 2.0, -3.0),
    ];
    for (bus, x, y) in positions {
        set_bus_geodata(&mut net, bus, x, y)?;
    }

    set_line_geodata(&mut net, hv_line, vec![[0.0, 0.0], [0.0, -1.0]])?;
    set_line_geodata(&mut net, mv_line_1, vec![[0.0, -2.5], [1.0, -2.5], [1.0, -3.0]])?;
    set_line_geodata(&mut net, mv_line_2, vec![[1.0, -3.0], [2.0, -3.0]])?;

    Ok(net)
}
