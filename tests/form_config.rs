/*!
 * Tests for form input handling shared by the CLI and the GUI
 *
 * These cover saving/loading form values and turning them into a render
 * configuration without drawing anything.
 */

use rubix_rs::models::{
    ColorbarLocation, DataAxis, Dimension, DuplicateColumns, PlotDimensions, SeparatorValue,
    TableShape,
};
use rubix_rs::session::{FormInput, RenderConfig, parse_list};
use rubix_rs::sizing::{PolicyPreset, SizingPolicy};
use rubix_rs::{ErrorKind, storage};
use tempfile::TempDir;

#[test]
fn test_parse_list_function() {
    assert_eq!(parse_list("G1,G2,G3"), vec!["G1", "G2", "G3"]);
    assert_eq!(parse_list("G1, G2 , G3 "), vec!["G1", "G2", "G3"]);
    // semicolons belong to the label
    assert_eq!(parse_list("G1;a, G2"), vec!["G1;a", "G2"]);
    assert!(parse_list("").is_empty());
    assert_eq!(parse_list("G1"), vec!["G1"]);
}

#[test]
fn form_defaults_match_render_defaults() {
    let form = FormInput::default();
    assert_eq!(form.color_scaling_quantile, 95);
    assert_eq!(form.scale_along, Some(DataAxis::Columns));
    assert_eq!(form.colorbar_location, ColorbarLocation::Top);
    assert_eq!(form.duplicate_metadata_cols, DuplicateColumns::No);
    assert_eq!(form.sep_value, SeparatorValue::UserColor);
    assert_eq!(form.colormap_main, "coolwarm");
    assert!(form.show_colorbar);
    assert!(!form.show_rows_legend);
}

#[test]
fn form_round_trips_through_json() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("form.json");
    let form = FormInput {
        width: Some("proportional".into()),
        height: Some("450".into()),
        normalize_along: Some(DataAxis::Rows),
        duplicate_metadata_cols: DuplicateColumns::Auto,
        row_labels_for_highlighting: "G1, G7".into(),
        ..FormInput::default()
    };
    storage::save_json(&form, &path).unwrap();
    let back: FormInput = storage::load_json(&path).unwrap();
    assert_eq!(back, form);
}

#[test]
fn partial_json_form_keeps_defaults() {
    let form: FormInput =
        serde_json::from_str(r#"{"duplicate_metadata_cols": "auto", "sep_value": "adapt"}"#).unwrap();
    assert_eq!(form.duplicate_metadata_cols, DuplicateColumns::Auto);
    assert_eq!(form.sep_value, SeparatorValue::Adapt);
    assert_eq!(form.color_scaling_quantile, 95);
    assert!(form.width.is_none());
}

#[test]
fn config_records_requested_and_resolved_sizes() {
    let form = FormInput {
        width: Some("proportional".into()),
        height: Some("300".into()),
        ..FormInput::default()
    };
    let config =
        RenderConfig::build(&form, Some(TableShape::new(5, 10)), &SizingPolicy::standard()).unwrap();
    assert_eq!(config.requested.width, Dimension::Proportional);
    assert_eq!(config.dimensions, PlotDimensions::new(600, 300));
    assert_eq!(config.geometry.total_width, 600 + config.geometry.margin_left + config.geometry.margin_right);
}

#[test]
fn invalid_dimension_is_a_configuration_error() {
    let form = FormInput {
        height: Some("tall".into()),
        ..FormInput::default()
    };
    let err = RenderConfig::build(&form, None, &SizingPolicy::standard()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("tall"));
}

#[test]
fn compact_preset_caps_tall_defaults() {
    let shape = Some(TableShape::new(400, 20));
    let standard = RenderConfig::build(&FormInput::default(), shape, &PolicyPreset::Standard.policy()).unwrap();
    let compact = RenderConfig::build(&FormInput::default(), shape, &PolicyPreset::Compact.policy()).unwrap();
    assert_eq!(standard.dimensions.height, 2400);
    assert_eq!(compact.dimensions.height, 600);
    assert!(compact.geometry.total_height < standard.geometry.total_height);
}

#[test]
fn out_of_range_quantile_from_config_file_is_rejected() {
    let form: FormInput = serde_json::from_str(r#"{"color_scaling_quantile": 50}"#).unwrap();
    let err = RenderConfig::build(&form, None, &SizingPolicy::standard()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("50"));
}
