//! Server selection: narrows the configured servers to the set an `apply` run targets.
//!
//! Selection happens in two steps. [`resolve_server_filters`] folds a named
//! template into the command-line filters, then [`resolve_target_servers`]
//! validates the flag combination and picks the servers.

use std::collections::HashSet;

use crate::config::{MmcpConfig, ServerMap, TemplateDefinition};
use crate::error::{EmptySelectionCause, MmcpError};

/// Filter value that matches every configured server.
pub const ALL_SERVERS: &str = "ALL";

/// Raw filter flags as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerFilterInput {
    pub servers: Vec<String>,
    pub exclude: Vec<String>,
    pub template: Option<String>,
    pub reset: bool,
    pub allow_empty: bool,
}

impl ServerFilterInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_servers(mut self, servers: Vec<String>) -> Self {
        self.servers = servers;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

/// Filters after template expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerFilterOptions {
    pub servers: Vec<String>,
    pub exclude: Vec<String>,
    pub reset: bool,
    pub allow_empty: bool,
}

/// Fold the named template, if any, into the command-line filters.
pub fn resolve_server_filters(
    config: &MmcpConfig,
    input: &ServerFilterInput,
) -> Result<ServerFilterOptions, MmcpError> {
    let mut options = ServerFilterOptions {
        servers: input.servers.clone(),
        exclude: input.exclude.clone(),
        reset: input.reset,
        allow_empty: input.allow_empty,
    };

    let Some(name) = input.template.as_deref() else {
        return Ok(options);
    };
    let template = config
        .templates
        .get(name)
        .ok_or_else(|| MmcpError::TemplateNotFound(name.to_string()))?;

    match template {
        TemplateDefinition::Servers(servers) => {
            if !input.exclude.is_empty() {
                return Err(MmcpError::ConflictingFilter(
                    "Template provides servers, but --exclude is also specified.".to_string(),
                ));
            }
            options.servers = merge_unique(servers, &input.servers);
            options.exclude = Vec::new();
        }
        TemplateDefinition::Exclude(exclude) => {
            if !input.servers.is_empty() {
                return Err(MmcpError::ConflictingFilter(
                    "Template provides exclude, but --servers is also specified.".to_string(),
                ));
            }
            options.exclude = merge_unique(exclude, &input.exclude);
            options.servers = Vec::new();
        }
    }

    tracing::debug!(
        template = name,
        servers = ?options.servers,
        exclude = ?options.exclude,
        "expanded template"
    );
    Ok(options)
}

/// Pick the servers to apply, in selection order.
pub fn resolve_target_servers(
    config: &MmcpConfig,
    options: &ServerFilterOptions,
) -> Result<ServerMap, MmcpError> {
    if !options.servers.is_empty() && !options.exclude.is_empty() {
        return Err(MmcpError::ConflictingFilter(
            "Cannot use --servers and --exclude together.".to_string(),
        ));
    }
    if options.allow_empty && !options.reset {
        return Err(MmcpError::InvalidCombination(
            "--allow-empty can only be used with --reset.".to_string(),
        ));
    }
    if options.reset && options.servers.is_empty() && options.exclude.is_empty() {
        return Err(MmcpError::MissingFilter(
            "Cannot use --reset without --servers or --exclude.".to_string(),
        ));
    }

    let all = &config.mcp_servers;
    let selected: ServerMap = if !options.servers.is_empty() {
        if options.servers.iter().any(|name| name == ALL_SERVERS) {
            all.clone()
        } else {
            options
                .servers
                .iter()
                .filter_map(|name| all.get(name).map(|server| (name.clone(), server.clone())))
                .collect()
        }
    } else if !options.exclude.is_empty() {
        if options.exclude.iter().any(|name| name == ALL_SERVERS) {
            ServerMap::new()
        } else {
            let excluded: HashSet<&str> = options.exclude.iter().map(String::as_str).collect();
            all.iter()
                .filter(|(name, _)| !excluded.contains(name))
                .map(|(name, server)| (name.to_string(), server.clone()))
                .collect()
        }
    } else {
        all.clone()
    };

    if selected.is_empty() && !(options.reset && options.allow_empty) {
        let cause = if options.reset {
            EmptySelectionCause::Reset
        } else {
            EmptySelectionCause::Filters
        };
        return Err(MmcpError::EmptySelection(cause));
    }

    Ok(selected)
}

/// `first` followed by the items of `second` not already present; first occurrence wins.
pub fn merge_unique(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|name| seen.insert(*name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unique_keeps_first_occurrence() {
        let first = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let second = vec!["c".to_string(), "b".to_string()];

        assert_eq!(merge_unique(&first, &second), vec!["a", "b", "c"]);
    }

    #[test]
    fn input_builder_sets_fields() {
        let input = ServerFilterInput::new()
            .with_servers(vec!["x".to_string()])
            .with_template("dev")
            .with_reset(true)
            .with_allow_empty(true);

        assert_eq!(input.servers, vec!["x"]);
        assert!(input.exclude.is_empty());
        assert_eq!(input.template.as_deref(), Some("dev"));
        assert!(input.reset && input.allow_empty);
    }
}
