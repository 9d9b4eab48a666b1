use plcad_geom::{indexed_core_map, multilayer_layout, ring_layout};

fn radius(x: f64, y: f64) -> f64 {
    (x * x + y * y).sqrt()
}

#[test]
fn nineteen_core_bundle_packs_three_layers() {
    let (core_map, cap_dia) = indexed_core_map(&[(1, 1.0), (6, 1.0), (12, 1.0)], 125.0);
    assert_eq!(core_map.len(), 19);
    assert!((cap_dia - 625.0).abs() < 1e-9);

    let keys: Vec<&str> = core_map.keys().collect();
    assert_eq!(keys.first().copied(), Some("0"));
    assert_eq!(keys.last().copied(), Some("18"));

    let centre = core_map.get("0").unwrap();
    assert_eq!((centre.x, centre.y), (0.0, 0.0));
    let inner = core_map.get("1").unwrap();
    assert!((radius(inner.x, inner.y) - 125.0).abs() < 1e-9);
    let outer = core_map.get("7").unwrap();
    assert!((radius(outer.x, outer.y) - 250.0).abs() < 1e-9);
}

#[test]
fn centre_with_single_ring_sits_one_diameter_out() {
    let layout = multilayer_layout(125.0, &[(1, 1.0), (5, 1.0)]);
    assert_eq!(layout.count(), 6);
    assert_eq!(layout.radii, vec![0.0, 125.0]);
    for coord in &layout.layers[1] {
        assert!((radius(coord.x, coord.y) - 125.0).abs() < 1e-9);
    }
    let first = layout.layers[1][0];
    assert!(first.x.abs() < 1e-9);
    assert!((first.y - 125.0).abs() < 1e-9);
}

#[test]
fn single_fiber_is_centred() {
    let (core_map, cap_dia) = indexed_core_map(&[(1, 1.0)], 125.0);
    assert_eq!(core_map.len(), 1);
    assert_eq!(cap_dia, 125.0);
}

#[test]
fn ring_neighbours_touch() {
    let ring = ring_layout(125.0, 6, 0.0);
    assert_eq!(ring.centres.len(), 6);
    let a = ring.centres[0];
    let b = ring.centres[1];
    assert!((radius(a.x - b.x, a.y - b.y) - 125.0).abs() < 1e-9);
}

#[test]
fn empty_layers_are_skipped() {
    let layout = multilayer_layout(125.0, &[(3, 1.0), (0, 1.0), (9, 1.0)]);
    assert_eq!(layout.layers.len(), 2);
    assert_eq!(layout.count(), 12);
}
