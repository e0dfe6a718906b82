use gridnet::control::{add_controller, ConstControl, ContinuousTapControl};
use gridnet::network::{
    CloneError, Geometry, GeometryKind, LineString, NetworkCloner, SharedNetwork, TableKind, Value,
};
use gridnet::networks::example_simple;
use gridnet::timeseries::{Frame, FrameData, ProfileName};

fn controlled_network(geometries: bool) -> SharedNetwork {
    let net = example_simple().unwrap();
    if geometries {
        net.write().attach_geometries(Some("epsg:4326")).unwrap();
    }

    add_controller(&net, ContinuousTapControl::new(&net, 0, 1.0).unwrap()).unwrap();

    let frame = Frame::from_rows(vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap();
    let control = ConstControl::new(
        &net,
        "load",
        "p_mw",
        vec![0],
        vec![ProfileName::Index(0)],
        Some(Box::new(FrameData::new(frame))),
    )
    .unwrap();
    add_controller(&net, control).unwrap();
    net
}

#[test]
fn test_controllers_point_at_their_copy() {
    let net = controlled_network(false);
    let copy = net.deep_copy().unwrap();

    let guard = copy.read();
    assert_eq!(guard.controller.len(), 2);
    for (_, row) in guard.controller.iter() {
        assert!(row.object.network().points_to(&copy));
    }

    let tap = guard.controller.object_as::<ContinuousTapControl>(0).unwrap();
    assert_eq!(tap.tid, 0);
}

/// Change the first line coordinate, bus 0 voltage and the first profile value
fn edit(net: &SharedNetwork) {
    let mut guard = net.write();
    guard
        .table_mut("line_geodata")
        .unwrap()
        .data_mut()
        .get_mut(0, "coords")
        .unwrap()
        .as_coords_mut()
        .unwrap()[0] = [9.0, 9.0];
    guard.table_mut("bus").unwrap().data_mut().set(0, "vn_kv", 220.0).unwrap();

    let control = guard.controller.object_as_mut::<ConstControl>(1).unwrap();
    let source = control.data_source.as_deref_mut().unwrap();
    source.buffer_mut().set(0, &ProfileName::Index(0), 42.0).unwrap();
}

fn assert_unedited(net: &SharedNetwork) {
    let guard = net.read();
    let line = guard.table("line_geodata").unwrap().data().row(0).unwrap();
    assert_eq!(line.coords("coords").unwrap()[0], [0.0, 0.0]);
    assert_eq!(
        guard.table("bus").unwrap().data().get(0, "vn_kv").unwrap(),
        &Value::Float(110.0)
    );

    let control = guard.controller.object_as::<ConstControl>(1).unwrap();
    assert_eq!(control.values_at(0).unwrap(), vec![0.0]);
}

fn assert_edited(net: &SharedNetwork) {
    let guard = net.read();
    let line = guard.table("line_geodata").unwrap().data().row(0).unwrap();
    assert_eq!(line.coords("coords").unwrap()[0], [9.0, 9.0]);

    let control = guard.controller.object_as::<ConstControl>(1).unwrap();
    assert_eq!(control.values_at(0).unwrap(), vec![42.0]);
}

#[test]
fn test_copy_edits_leave_source_alone() {
    let net = controlled_network(false);
    let copy = net.deep_copy().unwrap();

    edit(&copy);
    assert_edited(&copy);
    assert_unedited(&net);
}

#[test]
fn test_source_edits_leave_copy_alone() {
    let net = controlled_network(false);
    let copy = net.deep_copy().unwrap();

    edit(&net);
    assert_edited(&net);
    assert_unedited(&copy);
}

#[test]
fn test_data_sources_are_distinct() {
    let net = controlled_network(false);
    let copy = net.deep_copy().unwrap();

    let source = net.read();
    let copied = copy.read();
    let a = source.controller.get(1).unwrap().object.data_source().unwrap();
    let b = copied.controller.get(1).unwrap().object.data_source().unwrap();

    assert!(!std::ptr::addr_eq(a, b));
    assert!(!std::ptr::eq(a.buffer(), b.buffer()));
    assert_eq!(a.buffer(), b.buffer());
    assert!(copied.controller.get(0).unwrap().object.data_source().is_none());
}

#[test]
fn test_geo_tables_keep_their_type() {
    let net = controlled_network(true);
    let copy = net.deep_copy().unwrap();

    let source = net.read();
    let copied = copy.read();
    for (name, kind) in [("bus_geodata", GeometryKind::Point), ("line_geodata", GeometryKind::LineString)] {
        let original = source.table(name).unwrap();
        let table = copied.table(name).unwrap();
        assert_eq!(table.kind(), TableKind::Geo);
        assert_eq!(table, original);

        let geo = table.as_geo().unwrap();
        assert_eq!(geo.crs(), Some("epsg:4326"));
        assert!(geo.geometries().all(|(_, g)| g.kind() == kind));
    }
    assert_eq!(copied.table("bus").unwrap().kind(), TableKind::Plain);
}

#[test]
fn test_geometry_edits_stay_in_copy() {
    let net = controlled_network(true);
    let copy = net.deep_copy().unwrap();

    {
        let mut guard = copy.write();
        let geo = guard.table_mut("line_geodata").unwrap().as_geo_mut().unwrap();
        geo.set_geometry(0, Geometry::LineString(LineString::default())).unwrap();
    }

    let source = net.read();
    let line = source
        .table("line_geodata")
        .unwrap()
        .as_geo()
        .unwrap()
        .geometry(0)
        .unwrap()
        .as_line_string()
        .unwrap();
    assert_eq!(line.points().len(), 2);
}

#[test]
fn test_copy_of_copy() {
    let net = controlled_network(true);
    let first = net.deep_copy().unwrap();
    let second = first.deep_copy().unwrap();

    assert!(!second.ptr_eq(&first));
    for (_, row) in second.read().controller.iter() {
        assert!(row.object.network().points_to(&second));
        assert!(!row.object.network().points_to(&first));
        assert!(!row.object.network().points_to(&net));
    }

    {
        let a = first.read();
        let b = second.read();
        let first_source = a.controller.get(1).unwrap().object.data_source().unwrap();
        let second_source = b.controller.get(1).unwrap().object.data_source().unwrap();
        assert!(!std::ptr::addr_eq(first_source, second_source));
        assert!(!std::ptr::eq(first_source.buffer(), second_source.buffer()));
    }

    assert_eq!(
        serde_json::to_value(second.summary()).unwrap(),
        serde_json::to_value(net.summary()).unwrap()
    );

    edit(&second);
    assert_edited(&second);
    assert_unedited(&first);
    assert_unedited(&net);

    edit(&first);
    assert_edited(&first);
    assert_unedited(&net);
}

#[test]
fn test_source_summary_survives_copy() {
    let net = controlled_network(false);
    let before = serde_json::to_value(net.summary()).unwrap();
    let _copy = NetworkCloner::clone_network(&net).unwrap();
    assert_eq!(serde_json::to_value(net.summary()).unwrap(), before);
}

#[test]
fn test_foreign_controller_blocks_copy() {
    let net = controlled_network(false);
    let other = example_simple().unwrap();

    {
        let mut guard = net.write();
        guard
            .controller
            .get_mut(0)
            .unwrap()
            .object
            .set_network(other.downgrade());
    }

    assert_eq!(
        net.deep_copy().unwrap_err(),
        CloneError::ForeignBackReference { index: 0 }
    );
}
