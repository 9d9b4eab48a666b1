use plcad_core::errors::PlcadError;
use plcad_geom::{group_by_radial, layers_for_modes, mode_core_map, modes_below_cutoff};

#[test]
fn lp02_supports_four_modes_in_cutoff_order() {
    let modes = modes_below_cutoff("LP02").unwrap();
    assert_eq!(modes, vec!["LP01", "LP11", "LP21", "LP02"]);

    let groups = group_by_radial(&modes);
    assert_eq!(groups[&1], vec!["LP01", "LP11", "LP21"]);
    assert_eq!(groups[&2], vec!["LP02"]);
    assert_eq!(layers_for_modes(&groups), vec![(1, 1.0), (5, 1.0)]);
}

#[test]
fn lp02_core_map_has_centre_and_ring_of_five() {
    let (core_map, cap_dia) = mode_core_map("LP02", 125.0).unwrap();
    let keys: Vec<&str> = core_map.keys().collect();
    assert_eq!(keys, vec!["LP02", "LP01", "LP11a", "LP11b", "LP21a", "LP21b"]);
    assert!((cap_dia - 375.0).abs() < 1e-9);

    let centre = core_map.get("LP02").unwrap();
    assert_eq!((centre.x, centre.y), (0.0, 0.0));
}

#[test]
fn fundamental_mode_only_needs_one_core() {
    let (core_map, cap_dia) = mode_core_map("LP01", 125.0).unwrap();
    assert_eq!(core_map.len(), 1);
    assert!(core_map.contains_key("LP01"));
    assert_eq!(cap_dia, 125.0);
}

#[test]
fn lp11_places_three_cores_on_one_ring() {
    let (core_map, _) = mode_core_map("LP11", 125.0).unwrap();
    let keys: Vec<&str> = core_map.keys().collect();
    assert_eq!(keys, vec!["LP01", "LP11a", "LP11b"]);
}

#[test]
fn unknown_mode_is_rejected() {
    let err = mode_core_map("LP99", 125.0).unwrap_err();
    assert!(matches!(err, PlcadError::Geometry(info) if info.code == "modes.unknown"));
}
