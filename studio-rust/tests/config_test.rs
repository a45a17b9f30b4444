mod common;

use common::funnel_json;
use copyfunnel_studio::{
    render, AdminGate, FunnelCopy, StudioConfig, DEFAULT_ADMIN_PIN, DEFAULT_MODEL,
};
use std::{collections::HashMap, path::PathBuf};

fn config_from(vars: &[(&str, &str)]) -> StudioConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    StudioConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]);

    assert_eq!(config.api_key, None);
    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.data_dir, PathBuf::from(".copyfunnel"));
    assert!(config.admin_gate().verify(DEFAULT_ADMIN_PIN));
}

#[test]
fn api_key_falls_back_through_the_known_variables() {
    let config = config_from(&[
        ("GEMINI_API_KEY", " "),
        ("GOOGLE_API_KEY", "g-key"),
        ("API_KEY", "a-key"),
    ]);
    assert_eq!(config.api_key.as_deref(), Some("g-key"));

    let config = config_from(&[("API_KEY", "a-key")]);
    assert_eq!(config.api_key.as_deref(), Some("a-key"));
}

#[test]
fn environment_overrides_model_dir_and_pin() {
    let config = config_from(&[
        ("COPYFUNNEL_MODEL", "gemini-2.5-pro"),
        ("COPYFUNNEL_DATA_DIR", "/tmp/funnels"),
        ("COPYFUNNEL_ADMIN_PIN", "9876"),
        ("COPYFUNNEL_GOOGLE_BASE_URL", "http://localhost:9000/v1beta"),
    ]);

    assert_eq!(config.model, "gemini-2.5-pro");
    assert_eq!(config.data_dir, PathBuf::from("/tmp/funnels"));
    assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000/v1beta"));
    assert!(config.admin_gate().verify("9876"));
    assert!(!config.admin_gate().verify(DEFAULT_ADMIN_PIN));
}

#[test]
fn gate_ignores_surrounding_whitespace() {
    let gate = AdminGate::default();
    assert!(gate.verify(" 1234\n"));
    assert!(!gate.verify("12345"));
}

#[test]
fn copy_text_matches_the_clipboard_layout() {
    let copy: FunnelCopy = serde_json::from_value(funnel_json()).unwrap();

    assert_eq!(
        render::email_text(&copy.emails[2]),
        "Subject: Last chance\n\nDoors close tonight"
    );
    assert_eq!(
        render::ad_text(&copy.ads[0]),
        "Headline: Warm leads on autopilot\n\nTired of cold leads?\n\nTry it free"
    );
}
