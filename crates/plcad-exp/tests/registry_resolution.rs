
use std::collections::BTreeMap;

use plcad_core::errors::PlcadError;
use plcad_core::{LanternBuilder, LaunchMode};
use plcad_exp::{
    make_parameterised_lantern, resolve, ArchetypeRegistry, CommonParams, SimType, SortNeff,
};
use plcad_lantern::PhotonicLantern;
use proptest::prelude::*;
use serde_json::json;

use fixtures::{common_in, options, FixedLantern};

#[test]
fn builtins_resolve_by_name() {
    let registry = ArchetypeRegistry::with_builtins();
    assert_eq!(registry.names(), vec!["mode_selective", "photonic"]);

    let mode_selective = registry.resolve("mode_selective").unwrap();
    assert_eq!(mode_selective.default_launch_mode, LaunchMode::from("LP01"));
    assert_eq!(mode_selective.file_prefix, "mspl");
    assert_eq!(mode_selective.required_params, vec!["highest_mode"]);
    assert_eq!(mode_selective.primary_param, "highest_mode");

    let photonic = registry.resolve("photonic").unwrap();
    assert_eq!(photonic.default_launch_mode, LaunchMode::from("0"));
    assert_eq!(photonic.file_prefix, "photonic_lantern");
    assert_eq!(photonic.primary_param, "layer_config");
}

#[test]
fn unknown_archetype_lists_every_registered_name() {
    let mut registry = ArchetypeRegistry::with_builtins();
    registry.register(
        "fixed",
        || Box::new(FixedLantern::new(125.0)) as Box<dyn LanternBuilder>,
        "0",
        "fixed",
        &[],
        "size",
    );
    let err = registry.resolve("bundle").unwrap_err();
    match err {
        PlcadError::UnknownArchetype(info) => {
            assert_eq!(info.context["lantern_type"], "bundle");
            assert_eq!(info.list("available"), vec!["fixed", "mode_selective", "photonic"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn separator_like_names_survive_the_error_listing() {
    let mut registry = ArchetypeRegistry::new();
    registry.register(
        "a, b",
        || Box::new(FixedLantern::new(125.0)) as Box<dyn LanternBuilder>,
        "0",
        "ab",
        &[],
        "size",
    );
    let err = registry.resolve("c").unwrap_err();
    assert!(matches!(
        err,
        PlcadError::UnknownArchetype(ref info) if info.list("available") == vec!["a, b"]
    ));
}

#[test]
fn primary_outside_required_list_is_not_reported_missing() {
    let mut registry = ArchetypeRegistry::new();
    registry.register(
        "fixed",
        || Box::new(FixedLantern::new(125.0)) as Box<dyn LanternBuilder>,
        "0",
        "fixed",
        &["pitch"],
        "size",
    );
    let descriptor = registry.resolve("fixed").unwrap();

    let resolved = resolve(
        descriptor,
        &CommonParams::default(),
        &options(&[("pitch", json!(1))]),
    )
    .unwrap();
    assert_eq!(resolved.lantern_params.option("size"), None);

    let err = resolve(descriptor, &CommonParams::default(), &options(&[])).unwrap_err();
    assert!(matches!(
        err,
        PlcadError::MissingRequiredParameters(ref info) if info.list("missing") == vec!["pitch"]
    ));
}

#[test]
fn absent_primary_surfaces_from_the_builder() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ArchetypeRegistry::new();
    registry.register(
        "loose",
        || Box::new(PhotonicLantern::default()) as Box<dyn LanternBuilder>,
        "0",
        "loose",
        &[],
        "layer_config",
    );
    let err = make_parameterised_lantern(&registry, "loose", &common_in(dir.path()), &options(&[]))
        .unwrap_err();
    assert!(matches!(err, PlcadError::Construction(info) if info.code == "params.option_missing"));
    assert!(!dir.path().join("pl_property_scan").exists());
}

#[test]
fn registering_again_overwrites() {
    let mut registry = ArchetypeRegistry::with_builtins();
    registry.register(
        "photonic",
        || Box::new(PhotonicLantern::default()) as Box<dyn LanternBuilder>,
        "3",
        "ring_lantern",
        &["layer_config"],
        "layer_config",
    );
    assert_eq!(registry.len(), 2);
    let descriptor = registry.resolve("photonic").unwrap();
    assert_eq!(descriptor.file_prefix, "ring_lantern");
    assert_eq!(descriptor.default_launch_mode, LaunchMode::from("3"));
}

#[test]
fn resolver_applies_default_launch_mode() {
    let registry = ArchetypeRegistry::with_builtins();
    let descriptor = registry.resolve("mode_selective").unwrap();
    let resolved = resolve(
        descriptor,
        &CommonParams::default(),
        &options(&[("highest_mode", json!("LP11"))]),
    )
    .unwrap();
    assert_eq!(resolved.lantern_params.launch_mode, LaunchMode::from("LP01"));
    assert_eq!(resolved.sim_type, SimType::Beamprop);
    assert_eq!(resolved.sort_neff, SortNeff::HighestFirst);
    assert_eq!(resolved.lantern_params.option("highest_mode"), Some(&json!("LP11")));

    let common = CommonParams {
        launch_mode: Some(LaunchMode::Multiple(vec!["LP11a".into(), "LP11b".into()])),
        ..CommonParams::default()
    };
    let resolved = resolve(
        descriptor,
        &common,
        &options(&[("highest_mode", json!("LP11"))]),
    )
    .unwrap();
    assert_eq!(resolved.lantern_params.launch_mode.modes(), vec!["LP11a", "LP11b"]);
}

#[test]
fn extra_options_pass_through() {
    let registry = ArchetypeRegistry::with_builtins();
    let descriptor = registry.resolve("photonic").unwrap();
    let resolved = resolve(
        descriptor,
        &CommonParams::default(),
        &options(&[
            ("layer_config", json!([[3, 1.0]])),
            ("fiber_spacing", json!(130.0)),
        ]),
    )
    .unwrap();
    assert_eq!(resolved.lantern_params.options.len(), 2);
    assert_eq!(resolved.lantern_params.option("fiber_spacing"), Some(&json!(130.0)));
}

#[test]
fn invalid_sim_type_and_sort_order_are_rejected() {
    let registry = ArchetypeRegistry::with_builtins();
    let descriptor = registry.resolve("photonic").unwrap();
    let opts = options(&[("layer_config", json!([[3, 1.0]]))]);

    let common = CommonParams {
        sim_type: "fdtd".into(),
        ..CommonParams::default()
    };
    let err = resolve(descriptor, &common, &opts).unwrap_err();
    assert!(matches!(err, PlcadError::InvalidSimulationType(info) if info.context["sim_type"] == "fdtd"));

    let common = CommonParams {
        sort_neff: 3,
        ..CommonParams::default()
    };
    let err = resolve(descriptor, &common, &opts).unwrap_err();
    assert!(matches!(err, PlcadError::InvalidParameter(info) if info.code == "params.sort_neff"));

    let common = CommonParams {
        sim_type: "femsim".into(),
        sort_neff: 2,
        ..CommonParams::default()
    };
    let resolved = resolve(descriptor, &common, &opts).unwrap();
    assert_eq!(resolved.sim_type.tool(), "ST_FEMSIM");
    assert_eq!(resolved.sort_neff, SortNeff::LowestFirst);
}

#[test]
fn options_may_not_shadow_shared_names() {
    let registry = ArchetypeRegistry::with_builtins();
    let descriptor = registry.resolve("photonic").unwrap();
    let err = resolve(
        descriptor,
        &CommonParams::default(),
        &options(&[
            ("layer_config", json!([[3, 1.0]])),
            ("taper_factor", json!(4.0)),
            ("boundary_max", json!(10.0)),
        ]),
    )
    .unwrap_err();
    match err {
        PlcadError::InvalidParameter(info) => {
            assert_eq!(info.code, "params.shadowed_option");
            assert_eq!(info.list("options"), vec!["boundary_max", "taper_factor"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unusable_domain_inputs_fail_before_construction() {
    let registry = ArchetypeRegistry::with_builtins();
    let descriptor = registry.resolve("photonic").unwrap();
    let opts = options(&[("layer_config", json!([[3, 1.0]]))]);

    let common = CommonParams {
        num_grid: 0,
        ..CommonParams::default()
    };
    let err = resolve(descriptor, &common, &opts).unwrap_err();
    assert!(matches!(err, PlcadError::DomainDerivation(info) if info.code == "domain.num_grid"));

    let common = CommonParams {
        step_y: Some(-1.0),
        ..CommonParams::default()
    };
    let err = resolve(descriptor, &common, &opts).unwrap_err();
    assert!(matches!(err, PlcadError::DomainDerivation(info) if info.code == "domain.step"));

    let common = CommonParams {
        domain_min: 90_000.0,
        ..CommonParams::default()
    };
    let err = resolve(descriptor, &common, &opts).unwrap_err();
    assert!(matches!(err, PlcadError::DomainDerivation(info) if info.code == "taper.position"));
}

const REQUIRED: [&str; 4] = ["core_count", "pitch", "ring_count", "spacing"];

proptest! {
    #[test]
    fn missing_parameters_are_the_set_difference(
        supplied in proptest::sample::subsequence(REQUIRED.to_vec(), 0..=REQUIRED.len())
    ) {
        let mut registry = ArchetypeRegistry::new();
        registry.register(
            "grid",
            || Box::new(FixedLantern::new(125.0)) as Box<dyn LanternBuilder>,
            "0",
            "grid",
            &REQUIRED,
            "core_count",
        );
        let descriptor = registry.resolve("grid").unwrap();
        let opts: BTreeMap<String, serde_json::Value> = supplied
            .iter()
            .map(|name| (name.to_string(), json!(1)))
            .collect();
        let expected: Vec<String> = REQUIRED
            .iter()
            .filter(|name| !supplied.contains(name))
            .map(|name| name.to_string())
            .collect();

        match resolve(descriptor, &CommonParams::default(), &opts) {
            Ok(_) => prop_assert!(expected.is_empty()),
            Err(PlcadError::MissingRequiredParameters(info)) => {
                prop_assert_eq!(info.list("missing"), expected);
            }
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }
}
