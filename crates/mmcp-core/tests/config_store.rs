use std::fs;

use tempfile::TempDir;

use mmcp_core::config::{ConfigStore, MmcpConfig, ServerDefinition, TemplateDefinition};
use mmcp_core::context::AppContext;
use mmcp_core::error::MmcpError;

#[test]
fn load_missing_default_returns_empty_config() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::default_in(temp.path());

    let config = store.load().unwrap();

    assert!(config.agents.is_empty());
    assert!(config.mcp_servers.is_empty());
    assert!(config.templates.is_empty());
    assert!(!store.config_path().exists());
}

#[test]
fn load_missing_explicit_path_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("elsewhere.json");
    let store = ConfigStore::explicit(path.clone());

    let err = store.load().unwrap_err();

    match err.downcast_ref::<MmcpError>() {
        Some(MmcpError::ConfigFileNotFound(missing)) => assert_eq!(missing, &path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn default_path_given_explicitly_is_not_required_to_exist() {
    let temp = TempDir::new().unwrap();
    let app = AppContext::new(temp.path().to_path_buf(), temp.path().join(".config"));

    let store = app.config_store(Some(&app.default_config_path()));

    assert!(!store.is_explicit());
    assert!(store.load().unwrap().mcp_servers.is_empty());
}

#[test]
fn save_then_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::default_in(temp.path());

    let mut config = MmcpConfig::new();
    config.agents.push("cursor".to_string());
    config.mcp_servers.insert(
        "context7",
        ServerDefinition::stdio(
            "npx",
            vec!["-y".to_string(), "@upstash/context7-mcp".to_string()],
            vec![("API_KEY".to_string(), "secret".to_string())],
        ),
    );
    config
        .templates
        .insert("dev", TemplateDefinition::Servers(vec!["context7".to_string()]));

    store.save(&config).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, config);
    let raw = fs::read_to_string(store.config_path()).unwrap();
    assert!(raw.ends_with("}\n"));
    assert!(raw.starts_with("{\n  \"agents\": ["));
}

#[test]
fn unknown_server_fields_survive_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::default_in(temp.path());
    fs::write(
        store.config_path(),
        r#"{"mcpServers":{"s":{"command":"x","timeout":30,"cwd":"/srv","flags":{"beta":true}}}}"#,
    )
    .unwrap();

    let config = store.load().unwrap();
    store.save(&config).unwrap();
    let reloaded: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.config_path()).unwrap()).unwrap();

    assert_eq!(
        reloaded["mcpServers"]["s"],
        serde_json::json!({"command": "x", "timeout": 30, "cwd": "/srv", "flags": {"beta": true}})
    );
}

#[test]
fn invalid_config_reports_path() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::default_in(temp.path());
    fs::write(
        store.config_path(),
        r#"{"templates":{"t":{"servers":["a"],"exclude":["b"]}}}"#,
    )
    .unwrap();

    let err = store.load().unwrap_err();

    match err.downcast_ref::<MmcpError>() {
        Some(MmcpError::InvalidConfig { path, .. }) => assert_eq!(path, store.config_path()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn server_shapes_are_validated() {
    for bad in [
        r#"{"mcpServers":{"s":{"command":""}}}"#,
        r#"{"mcpServers":{"s":{"args":["ok", 1]}}}"#,
        r#"{"mcpServers":{"s":{"env":{"K": 1}}}}"#,
        r#"{"mcpServers":{"s":{"url":"not a url"}}}"#,
        r#"{"agents":[""]}"#,
    ] {
        let parsed: Result<MmcpConfig, _> = serde_json::from_str(bad);
        assert!(parsed.is_err(), "accepted {bad}");
    }

    let both: MmcpConfig = serde_json::from_str(
        r#"{"mcpServers":{"s":{"command":"x","url":"https://example.com/mcp"}}}"#,
    )
    .unwrap();
    assert!(both.mcp_servers.get("s").unwrap().url().is_some());
}
