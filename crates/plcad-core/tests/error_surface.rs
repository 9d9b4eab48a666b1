use plcad_core::errors::{ErrorInfo, PlcadError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("archetype", "photonic")
        .with_context("reason", "example")
}

#[test]
fn unknown_archetype_surface() {
    let err = PlcadError::UnknownArchetype(
        sample_info("registry.unknown", "no such archetype")
            .with_list("available", ["mode_selective", "photonic"]),
    );
    assert_eq!(err.info().code, "registry.unknown");
    assert_eq!(err.info().list("available"), vec!["mode_selective", "photonic"]);
}

#[test]
fn missing_parameters_surface() {
    let err = PlcadError::MissingRequiredParameters(
        sample_info("resolve.missing", "missing").with_list("missing", ["a", "b"]),
    );
    assert_eq!(err.info().list("missing").len(), 2);
    assert!(err.info().context.contains_key("archetype"));
}

#[test]
fn list_items_may_contain_separators() {
    let info = ErrorInfo::new("x", "y").with_list("available", ["a, b", "c"]);
    assert_eq!(info.list("available"), vec!["a, b", "c"]);
}

#[test]
fn empty_list_reads_back_empty() {
    let info = ErrorInfo::new("x", "y").with_list("missing", Vec::<String>::new());
    assert!(info.list("missing").is_empty());
    assert!(info.list("absent").is_empty());
}

#[test]
fn display_includes_context_and_hint() {
    let err = PlcadError::DomainDerivation(
        sample_info("domain.num_grid", "grid count must be positive").with_hint("set num_grid"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("domain derivation failure: grid count must be positive"));
    assert!(rendered.contains("archetype=photonic"));
    assert!(rendered.contains("hint: set num_grid"));
}

#[test]
fn errors_roundtrip_through_json() {
    let err = PlcadError::Construction(sample_info("lantern.layer", "bad layer"));
    let json = serde_json::to_string(&err).expect("encode");
    assert!(json.contains("\"family\":\"Construction\""));
    let back: PlcadError = serde_json::from_str(&json).expect("decode");
    assert_eq!(back, err);
}
