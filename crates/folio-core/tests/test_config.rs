use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use folio_core::config::ViewerConfig;
use folio_core::error::FolioError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_defaults() {
    let config = ViewerConfig::default();
    assert_eq!(config.network.token_env, "FOLIO_TOKEN");
    assert_eq!(config.network.timeout(), Duration::from_secs(30));
    assert_eq!(config.viewer.zoom_step, 10.0);
    assert_eq!(config.viewer.pan_padding, 24.0);
    assert_eq!(config.viewer.selection_transition(), Duration::from_millis(120));
    assert_eq!(config.viewer.open_external_grace(), Duration::from_secs(10));
    assert_eq!(config.thumbnails.width, 120);
    assert_eq!(config.thumbnails.height, 160);
    assert_eq!(config.thumbnails.rasterizer, "pdftoppm");
}

#[test]
fn test_empty_file_is_all_defaults() {
    let config = ViewerConfig::from_toml_str("").unwrap();
    assert_eq!(config, ViewerConfig::default());
}

#[test]
fn test_rendered_defaults_parse_back() {
    let text = ViewerConfig::default().to_toml().unwrap();
    assert!(text.contains("[viewer]"), "got: {text}");
    assert_eq!(ViewerConfig::from_toml_str(&text).unwrap(), ViewerConfig::default());
}

// ---------------------------------------------------------------------------
// Partial files
// ---------------------------------------------------------------------------

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = ViewerConfig::from_toml_str(
        r#"
        [network]
        base_url = "https://records.example/api"

        [viewer]
        zoom_step = 25.0
        "#,
    )
    .unwrap();
    assert_eq!(config.network.base_url.as_deref(), Some("https://records.example/api"));
    assert_eq!(config.network.token_env, "FOLIO_TOKEN");
    assert_eq!(config.viewer.zoom_step, 25.0);
    assert_eq!(config.viewer.pan_padding, 24.0);
    assert_eq!(config.viewer.transform_settings().zoom_step, 25.0);
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[thumbnails]\nwidth = 64\nrasterizer = \"\"").unwrap();

    let config = ViewerConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.thumbnails.width, 64);
    assert_eq!(config.thumbnails.height, 160);
    assert!(config.thumbnails.rasterizer.is_empty());
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_zero_zoom_step_rejected() {
    let err = ViewerConfig::from_toml_str("[viewer]\nzoom_step = 0.0").unwrap_err();
    assert!(matches!(err, FolioError::Config(_)));
}

#[test]
fn test_negative_padding_rejected() {
    let err = ViewerConfig::from_toml_str("[viewer]\npan_padding = -1.0").unwrap_err();
    assert!(err.to_string().contains("pan_padding"), "got: {err}");
}

#[test]
fn test_zero_thumbnail_size_rejected() {
    assert!(ViewerConfig::from_toml_str("[thumbnails]\nheight = 0").is_err());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = ViewerConfig::from_toml_str("[viewer\nzoom_step = ").unwrap_err();
    assert!(matches!(err, FolioError::Config(_)));
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(ViewerConfig::load(Some(&missing)).is_err());
}
