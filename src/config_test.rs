#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn empty_lookup_yields_defaults() {
    let cfg = EditorConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, EditorConfig::default());
}

#[test]
fn defaults_match_constants() {
    let cfg = EditorConfig::default();
    assert_eq!(cfg.canvas_width, 800.0);
    assert_eq!(cfg.canvas_height, 600.0);
    assert_eq!(cfg.grid_size, 10.0);
    assert_eq!(cfg.min_layer_size, 20.0);
    assert_eq!(cfg.snap_threshold, 5.0);
    assert_eq!(cfg.snap_strategy, SnapStrategy::Nearest);
    assert!(!cfg.snap_to_grid);
    assert!(cfg.snap_to_guides);
}

#[test]
fn defaults_validate() {
    assert!(EditorConfig::default().validate().is_ok());
}

// =============================================================
// Overrides
// =============================================================

#[test]
fn lookup_parses_overrides() {
    let cfg = EditorConfig::from_lookup(lookup_from(&[
        ("CARD_CANVAS_WIDTH", "1050"),
        ("CARD_CANVAS_HEIGHT", " 600 "),
        ("CARD_GRID_SIZE", "8"),
        ("CARD_MIN_LAYER_SIZE", "12.5"),
        ("CARD_SNAP_THRESHOLD", "3"),
        ("CARD_SNAP_STRATEGY", "first"),
        ("CARD_SNAP_TO_GRID", "yes"),
        ("CARD_SNAP_TO_GUIDES", "off"),
        ("CARD_HANDLE_RADIUS_PX", "10"),
    ]))
    .unwrap();
    assert_eq!(cfg.canvas_width, 1050.0);
    assert_eq!(cfg.canvas_height, 600.0);
    assert_eq!(cfg.grid_size, 8.0);
    assert_eq!(cfg.min_layer_size, 12.5);
    assert_eq!(cfg.snap_threshold, 3.0);
    assert_eq!(cfg.snap_strategy, SnapStrategy::First);
    assert!(cfg.snap_to_grid);
    assert!(!cfg.snap_to_guides);
    assert_eq!(cfg.handle_radius_px, 10.0);
}

// =============================================================
// Errors
// =============================================================

#[test]
fn malformed_number_is_parse_error() {
    let err = EditorConfig::from_lookup(lookup_from(&[("CARD_GRID_SIZE", "ten")])).unwrap_err();
    assert_eq!(err, ConfigError::Parse { var: "CARD_GRID_SIZE".into(), value: "ten".into() });
}

#[test]
fn malformed_bool_is_parse_error() {
    let err = EditorConfig::from_lookup(lookup_from(&[("CARD_SNAP_TO_GRID", "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref var, .. } if var == "CARD_SNAP_TO_GRID"));
}

#[test]
fn unknown_strategy_is_parse_error() {
    let err = EditorConfig::from_lookup(lookup_from(&[("CARD_SNAP_STRATEGY", "closest")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref value, .. } if value == "closest"));
}

#[test]
fn zero_canvas_width_is_invalid() {
    let err = EditorConfig::from_lookup(lookup_from(&[("CARD_CANVAS_WIDTH", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn negative_threshold_is_invalid() {
    let cfg = EditorConfig { snap_threshold: -1.0, ..EditorConfig::default() };
    assert!(cfg.validate().is_err());
}

#[test]
fn nan_min_size_is_invalid() {
    let cfg = EditorConfig { min_layer_size: f64::NAN, ..EditorConfig::default() };
    assert!(cfg.validate().is_err());
}

#[test]
fn error_display_names_variable() {
    let err = ConfigError::Parse { var: "CARD_GRID_SIZE".into(), value: "x".into() };
    assert!(err.to_string().contains("CARD_GRID_SIZE"));
}

// =============================================================
// Serde
// =============================================================

#[test]
fn deserialize_partial_json_fills_defaults() {
    let cfg: EditorConfig = serde_json::from_str(r#"{"grid_size": 4, "snap_strategy": "first"}"#).unwrap();
    assert_eq!(cfg.grid_size, 4.0);
    assert_eq!(cfg.snap_strategy, SnapStrategy::First);
    assert_eq!(cfg.canvas_width, 800.0);
}
