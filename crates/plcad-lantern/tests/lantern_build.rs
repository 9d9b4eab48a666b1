use std::collections::BTreeMap;

use plcad_core::errors::PlcadError;
use plcad_core::{
    LanternBuilder, LanternParams, LaunchMode, LaunchType, MonitorType, TaperConfig, TaperType,
};
use plcad_lantern::{ModeSelectiveLantern, PhotonicLantern};
use serde_json::{json, Value};

fn params(launch_mode: &str, options: &[(&str, Value)]) -> LanternParams {
    LanternParams {
        launch_mode: LaunchMode::from(launch_mode),
        opt_name: "run_000".into(),
        taper_factor: 21.0,
        taper_length: 80_000.0,
        core_dia_dict: None,
        cladding_dia_dict: None,
        bg_index_dict: None,
        cladding_index_dict: None,
        core_index_dict: None,
        monitor_type: MonitorType::FiberPower,
        launch_type: LaunchType::Gaussian,
        taper_config: TaperConfig::default(),
        capillary_od: 900.0,
        final_capillary_id: 40.0,
        num_points: 100,
        options: options
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    }
}

fn nineteen() -> Value {
    json!([[1, 1.0], [6, 1.0], [12, 1.0]])
}

#[test]
fn photonic_lantern_builds_nineteen_fibers() {
    let mut lantern = PhotonicLantern::default();
    let core_map = lantern
        .create_lantern(&params("0", &[("layer_config", nineteen())]))
        .unwrap();
    assert_eq!(core_map.len(), 19);
    assert!((lantern.capillary_outer_diameter() - 625.0).abs() < 1e-9);

    let circuit = lantern.circuit();
    assert_eq!(circuit.segment_count(), 2 * 19 + 1);
    assert_eq!(circuit.pathway_count(), 20);
    assert_eq!(circuit.monitor_count(), 20);
    assert_eq!(circuit.launch_field_count(), 1);
    assert_eq!(circuit.param("launch_pathway"), Some(&json!(1)));

    let text = circuit.render();
    assert!(text.contains("\tcomp_name = 18_CLADDING\n"));
    assert!(text.contains("\tcomp_name = CAPILLARY\n"));
    assert!(text.contains("\tmonitor_type = MONITOR_PARTIAL_POWER\n"));
    assert!(text.contains("\twidth_taper = TAPER_LINEAR\n"));
    assert!(text.contains("slice_display_mode = DISPLAY_CONTOURMAPXY\n"));
}

#[test]
fn launch_uses_the_launched_fiber_pathway() {
    let mut lantern = ModeSelectiveLantern::default();
    let core_map = lantern
        .create_lantern(&params("LP11a", &[("highest_mode", json!("LP02"))]))
        .unwrap();
    let keys: Vec<&str> = core_map.keys().collect();
    assert_eq!(keys, vec!["LP02", "LP01", "LP11a", "LP11b", "LP21a", "LP21b"]);
    assert_eq!(lantern.circuit().param("launch_pathway"), Some(&json!(3)));

    let fiber = lantern.bundle().get("LP11a").unwrap();
    assert_eq!(
        lantern.circuit().param("launch_position"),
        Some(&json!(fiber.position.x))
    );
}

#[test]
fn every_launch_mode_gets_a_field() {
    let mut lantern = ModeSelectiveLantern::default();
    let mut p = params("LP01", &[("highest_mode", json!("LP11"))]);
    p.launch_mode = LaunchMode::Multiple(vec!["LP01".into(), "LP11b".into()]);
    lantern.create_lantern(&p).unwrap();
    assert_eq!(lantern.circuit().launch_field_count(), 2);
}

#[test]
fn untapered_lantern_only_tags_the_capillary() {
    let mut lantern = PhotonicLantern::default();
    let mut p = params("0", &[("layer_config", nineteen())]);
    p.taper_factor = 1.0;
    lantern.create_lantern(&p).unwrap();
    let text = lantern.circuit().render();
    assert_eq!(text.matches("\twidth_taper = ").count(), 1);
}

#[test]
fn per_segment_taper_profiles_apply() {
    let mut lantern = PhotonicLantern::default();
    let mut p = params("0", &[("layer_config", json!([[3, 1.0]]))]);
    let mut tapers = BTreeMap::new();
    tapers.insert("core".to_string(), TaperType::Exponential);
    tapers.insert(
        "cap".to_string(),
        TaperType::User {
            file: "cap.dat".into(),
        },
    );
    p.taper_config = TaperConfig::PerSegment(tapers);
    lantern.create_lantern(&p).unwrap();

    let text = lantern.circuit().render();
    assert_eq!(text.matches("\twidth_taper = TAPER_EXPONENTIAL\n").count(), 3);
    assert_eq!(text.matches("\twidth_taper = TAPER_LINEAR\n").count(), 3);
    assert_eq!(text.matches("\twidth_taper = TAPER_USER_1\n").count(), 1);
    assert!(text.contains("\tfilename = cap.dat\n"));
}

#[test]
fn fiber_overrides_reach_segments_and_launch() {
    let mut lantern = PhotonicLantern::default();
    let mut p = params("1", &[("layer_config", json!([[3, 1.0]]))]);
    p.core_dia_dict = Some(BTreeMap::from([
        ("1".to_string(), 8.2),
        ("unknown".to_string(), 3.0),
    ]));
    lantern.create_lantern(&p).unwrap();
    assert_eq!(lantern.bundle().get("1").unwrap().props.core_dia, 8.2);
    assert_eq!(lantern.bundle().get("0").unwrap().props.core_dia, 10.4);
    assert_eq!(lantern.circuit().param("launch_width"), Some(&json!(8.2)));
}

#[test]
fn unknown_launch_mode_is_a_construction_error() {
    let mut lantern = PhotonicLantern::default();
    let err = lantern
        .create_lantern(&params("LP01", &[("layer_config", json!([[3, 1.0]]))]))
        .unwrap_err();
    match err {
        PlcadError::Construction(info) => {
            assert_eq!(info.code, "lantern.launch_mode");
            assert_eq!(info.list("available"), vec!["0", "1", "2"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn layout_failures_surface_as_construction_errors() {
    let mut lantern = ModeSelectiveLantern::default();
    let err = lantern
        .create_lantern(&params("LP01", &[("highest_mode", json!("LP99"))]))
        .unwrap_err();
    assert!(matches!(err, PlcadError::Construction(info) if info.code == "modes.unknown"));

    let mut lantern = PhotonicLantern::default();
    let err = lantern.create_lantern(&params("0", &[])).unwrap_err();
    assert!(matches!(err, PlcadError::Construction(info) if info.code == "params.option_missing"));

    let err = lantern
        .create_lantern(&params("0", &[("layer_config", json!("LP02"))]))
        .unwrap_err();
    assert!(matches!(err, PlcadError::Construction(info) if info.code == "params.option_malformed"));

    let err = lantern
        .create_lantern(&params("0", &[("layer_config", json!([[0, 1.0]]))]))
        .unwrap_err();
    assert!(matches!(err, PlcadError::Construction(info) if info.code == "layout.empty"));
}

#[test]
fn model_queries_need_a_built_lantern() {
    let lantern = PhotonicLantern::default();
    let err = lantern
        .model_property("capillary_inner_diameter", 0.0)
        .unwrap_err();
    assert!(matches!(err, PlcadError::Construction(info) if info.code == "lantern.not_built"));
}

#[test]
fn model_follows_the_capillary() {
    let mut lantern = ModeSelectiveLantern::default();
    lantern
        .create_lantern(&params("LP01", &[("highest_mode", json!("LP02"))]))
        .unwrap();
    let start = lantern
        .model_property("capillary_inner_diameter", 0.0)
        .unwrap();
    let end = lantern
        .model_property("capillary_inner_diameter", 80_000.0)
        .unwrap();
    assert!(start > end);
    assert!(start < 375.0);
}

#[test]
fn written_design_contains_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photonic_lantern_19_cores_run_000.ind");
    let mut lantern = PhotonicLantern::default();
    lantern
        .create_lantern(&params("0", &[("layer_config", nineteen())]))
        .unwrap();
    lantern.update_global_params(&[("boundary_max".to_string(), json!(338.0))]);
    lantern.write(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    for heading in [
        "# Global parameters",
        "# Segments",
        "# Pathways",
        "# Monitors",
        "# Launch Fields",
    ] {
        assert!(text.contains(heading), "missing {heading}");
    }
    assert!(text.contains("boundary_max = 338.0\n"));
}
