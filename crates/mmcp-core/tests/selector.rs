//! Server selection against a parsed mmcp config.

use mmcp_core::config::MmcpConfig;
use mmcp_core::error::{EmptySelectionCause, MmcpError};
use mmcp_core::selector::{
    ServerFilterInput, ServerFilterOptions, resolve_server_filters, resolve_target_servers,
};
use serde_json::json;

fn config() -> MmcpConfig {
    serde_json::from_value(json!({
        "mcpServers": {
            "X": {"command": "x"},
            "Y": {"command": "y"},
            "Z": {"url": "https://example.com/mcp"}
        },
        "templates": {
            "dev": {"servers": ["A", "B"]},
            "quiet": {"exclude": ["Y"]}
        }
    }))
    .expect("valid config")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn names(options: &ServerFilterOptions) -> Vec<String> {
    let selected = resolve_target_servers(&config(), options).expect("selection succeeds");
    selected.names().map(str::to_string).collect()
}

#[test]
fn named_selection_drops_unknown_and_duplicate_names() {
    let options = ServerFilterOptions {
        servers: strings(&["X", "missing", "X"]),
        ..Default::default()
    };

    assert_eq!(names(&options), vec!["X"]);
}

#[test]
fn named_selection_keeps_requested_order() {
    let options = ServerFilterOptions {
        servers: strings(&["Z", "X"]),
        ..Default::default()
    };

    assert_eq!(names(&options), vec!["Z", "X"]);
}

#[test]
fn no_filters_selects_everything() {
    assert_eq!(names(&ServerFilterOptions::default()), vec!["X", "Y", "Z"]);
}

#[test]
fn all_in_servers_selects_everything() {
    let options = ServerFilterOptions {
        servers: strings(&["Y", "ALL"]),
        ..Default::default()
    };

    assert_eq!(names(&options), vec!["X", "Y", "Z"]);
}

#[test]
fn exclude_keeps_config_order() {
    let options = ServerFilterOptions {
        exclude: strings(&["Y", "nope"]),
        ..Default::default()
    };

    assert_eq!(names(&options), vec!["X", "Z"]);
}

#[test]
fn exclude_all_without_reset_is_empty_selection() {
    let options = ServerFilterOptions {
        exclude: strings(&["ALL"]),
        ..Default::default()
    };

    let err = resolve_target_servers(&config(), &options).unwrap_err();

    assert!(matches!(
        err,
        MmcpError::EmptySelection(EmptySelectionCause::Filters)
    ));
    assert!(err.to_string().starts_with("No target servers to apply"));
}

#[test]
fn reset_to_nothing_needs_allow_empty() {
    let options = ServerFilterOptions {
        exclude: strings(&["ALL"]),
        reset: true,
        ..Default::default()
    };

    let err = resolve_target_servers(&config(), &options).unwrap_err();

    assert!(matches!(
        err,
        MmcpError::EmptySelection(EmptySelectionCause::Reset)
    ));
}

#[test]
fn reset_with_allow_empty_yields_empty_map() {
    let options = ServerFilterOptions {
        exclude: strings(&["ALL"]),
        reset: true,
        allow_empty: true,
        ..Default::default()
    };

    let selected = resolve_target_servers(&config(), &options).expect("empty selection allowed");

    assert!(selected.is_empty());
}

#[test]
fn flag_combinations_are_checked_in_order() {
    let both = ServerFilterOptions {
        servers: strings(&["X"]),
        exclude: strings(&["Y"]),
        allow_empty: true,
        ..Default::default()
    };
    assert!(matches!(
        resolve_target_servers(&config(), &both),
        Err(MmcpError::ConflictingFilter(_))
    ));

    let allow_without_reset = ServerFilterOptions {
        allow_empty: true,
        ..Default::default()
    };
    assert!(matches!(
        resolve_target_servers(&config(), &allow_without_reset),
        Err(MmcpError::InvalidCombination(_))
    ));

    let reset_without_filter = ServerFilterOptions {
        reset: true,
        ..Default::default()
    };
    assert!(matches!(
        resolve_target_servers(&config(), &reset_without_filter),
        Err(MmcpError::MissingFilter(_))
    ));
}

#[test]
fn template_servers_come_before_cli_servers() {
    let input = ServerFilterInput::new()
        .with_template("dev")
        .with_servers(strings(&["C", "A"]));

    let options = resolve_server_filters(&config(), &input).expect("template resolves");

    assert_eq!(options.servers, vec!["A", "B", "C"]);
    assert!(options.exclude.is_empty());
}

#[test]
fn template_exclude_merges_with_cli_exclude() {
    let input = ServerFilterInput::new()
        .with_template("quiet")
        .with_exclude(strings(&["X", "Y"]))
        .with_reset(true);

    let options = resolve_server_filters(&config(), &input).expect("template resolves");

    assert_eq!(options.exclude, vec!["Y", "X"]);
    assert!(options.reset);
    assert_eq!(names(&options), vec!["Z"]);
}

#[test]
fn template_conflicts_with_opposite_cli_filter() {
    let servers_template = ServerFilterInput::new()
        .with_template("dev")
        .with_exclude(strings(&["X"]));
    assert!(matches!(
        resolve_server_filters(&config(), &servers_template),
        Err(MmcpError::ConflictingFilter(_))
    ));

    let exclude_template = ServerFilterInput::new()
        .with_template("quiet")
        .with_servers(strings(&["X"]));
    assert!(matches!(
        resolve_server_filters(&config(), &exclude_template),
        Err(MmcpError::ConflictingFilter(_))
    ));
}

#[test]
fn unknown_template_is_an_error() {
    let input = ServerFilterInput::new().with_template("prod");

    let err = resolve_server_filters(&config(), &input).unwrap_err();

    assert_eq!(err.to_string(), "Template not found: prod.");
}

#[test]
fn selection_is_deterministic() {
    let options = ServerFilterOptions {
        exclude: strings(&["X"]),
        ..Default::default()
    };

    let first = names(&options);
    for _ in 0..5 {
        assert_eq!(names(&options), first);
    }
}
