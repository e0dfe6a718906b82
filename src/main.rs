use anyhow::{Context, Result};
use gridnet::control::{add_controller, run_const_controls, ConstControl, ContinuousTapControl};
use gridnet::lookup::{bus_lookup, get_indices};
use gridnet::network::{NetworkSummary, SharedNetwork};
use gridnet::networks::example_simple_network;
use gridnet::timeseries::{DataSource, Frame, FrameData, ProfileName};
use gridnet::{config::Config, telemetry::init_tracing};
use tracing::{info, warn};

fn main() -> Result<()> {
    let cfg = Config::load()?;
    init_tracing(&cfg.telemetry)?;

    let mut net = example_simple_network(&cfg.network.name, cfg.network.f_hz, cfg.network.sn_mva)?;
    if cfg.network.geometries {
        net.attach_geometries(cfg.network.geo_crs.as_deref())?;
    } else if cfg.network.geo_crs.is_some() {
        warn!("geo_crs is set but geometries are disabled");
    }
    let net = SharedNetwork::new(net);

    add_controller(&net, ContinuousTapControl::new(&net, 0, 1.02)?)?;

    let profiles = Frame::with_columns(
        vec!["sgen_p".to_string(), "load_p".to_string()],
        vec![vec![1.5, 2.0], vec![2.0, 2.4], vec![0.5, 1.8]],
    )?;
    let source: Box<dyn DataSource> = Box::new(FrameData::new(profiles));
    add_controller(
        &net,
        ConstControl::new(
            &net,
            "sgen",
            "p_mw",
            vec![0],
            vec![ProfileName::from("sgen_p")],
            Some(source.clone()),
        )?,
    )?;
    add_controller(
        &net,
        ConstControl::new(&net, "load", "p_mw", vec![0], vec![ProfileName::from("load_p")], Some(source))?,
    )?;

    let applied = run_const_controls(&mut net.write(), 1)?;
    info!(applied, "initial time step applied");

    let lookup = {
        let guard = net.read();
        bus_lookup(&guard, cfg.lookup.fuse_closed_bus_switches)?
    };
    let buses = lookup.original_order().to_vec();
    let positions = get_indices(&buses, &lookup, true)?;
    info!(
        buses = buses.len(),
        slots = lookup.slot_count(),
        fused = ?lookup.fused_groups(),
        ?positions,
        "bus lookup built"
    );

    let copy = net.deep_copy().context("deep copy of the network failed")?;
    info!(name = %copy.read().name, "network copied");

    let summary = NetworkSummary::of(&copy);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
