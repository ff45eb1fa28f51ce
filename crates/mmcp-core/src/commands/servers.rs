//! Server commands: add, remove and list entries of `mcpServers`.

use serde_json::{Map, Value};

use crate::config::{ConfigStore, ServerDefinition};
use crate::error::MmcpError;

/// Options for adding a server
#[derive(Debug, Clone)]
pub struct AddServerOptions {
    /// Server name (key in `mcpServers`)
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Environment assignments in `KEY=VALUE` form
    pub env: Vec<String>,
    /// Overwrite an existing server with the same name
    pub force: bool,
}

impl AddServerOptions {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            force: false,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Result of a server add/remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerReport {
    pub name: String,
    /// Whether the mmcp config was rewritten
    pub changed: bool,
    /// Whether an existing entry was overwritten (add --force)
    pub replaced: bool,
}

/// Listed server entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEntry {
    pub name: String,
    /// `command args...`, or the URL for remote servers
    pub summary: String,
}

/// Server command orchestrator
#[derive(Debug)]
pub struct ServerCommand {
    store: ConfigStore,
}

impl ServerCommand {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    pub fn add(&self, options: &AddServerOptions) -> anyhow::Result<ServerReport> {
        let env = options
            .env
            .iter()
            .map(|item| parse_env_assignment(item))
            .collect::<Result<Vec<_>, _>>()?;

        let mut config = self.store.load()?;
        let exists = config.mcp_servers.contains_key(&options.name);
        if exists && !options.force {
            return Err(MmcpError::ServerAlreadyExists(options.name.clone()).into());
        }

        let server = ServerDefinition::stdio(options.command.clone(), options.args.clone(), env);
        let changed = config.mcp_servers.get(&options.name) != Some(&server);
        if changed {
            config.mcp_servers.insert(options.name.clone(), server);
            self.store.save(&config)?;
        }

        Ok(ServerReport {
            name: options.name.clone(),
            changed,
            replaced: exists && changed,
        })
    }

    pub fn remove(&self, name: &str) -> anyhow::Result<ServerReport> {
        let mut config = self.store.load()?;
        if config.mcp_servers.remove(name).is_none() {
            return Err(MmcpError::ServerNotFound(name.to_string()).into());
        }
        self.store.save(&config)?;

        Ok(ServerReport {
            name: name.to_string(),
            changed: true,
            replaced: false,
        })
    }

    /// Servers sorted by name.
    pub fn list(&self) -> anyhow::Result<Vec<ServerEntry>> {
        let config = self.store.load()?;
        let mut entries: Vec<ServerEntry> = config
            .mcp_servers
            .iter()
            .map(|(name, server)| ServerEntry {
                name: name.to_string(),
                summary: server.summary(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// The `mcpServers` object as stored, in config order.
    pub fn list_json(&self) -> anyhow::Result<Value> {
        let config = self.store.load()?;
        let servers: Map<String, Value> = config
            .mcp_servers
            .iter()
            .map(|(name, server)| (name.to_string(), Value::Object(server.fields().clone())))
            .collect();
        Ok(Value::Object(servers))
    }
}

/// Split a `KEY=VALUE` assignment. Exactly one `=`, both sides non-empty.
pub fn parse_env_assignment(item: &str) -> Result<(String, String), MmcpError> {
    let invalid = || MmcpError::InvalidEnvAssignment(item.to_string());
    let (key, value) = item.split_once('=').ok_or_else(invalid)?;
    if key.is_empty() || value.is_empty() || value.contains('=') {
        return Err(invalid());
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_assignment() {
        assert_eq!(
            parse_env_assignment("API_KEY=secret").unwrap(),
            ("API_KEY".to_string(), "secret".to_string())
        );
        for bad in ["NOVALUE", "=value", "KEY=", "A=B=C", ""] {
            assert!(
                matches!(
                    parse_env_assignment(bad),
                    Err(MmcpError::InvalidEnvAssignment(ref s)) if s == bad
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_add_options_builder() {
        let options = AddServerOptions::new("fs", "mcp-fs")
            .with_args(vec!["--root".into(), "/".into()])
            .with_env(vec!["A=1".into()])
            .with_force(true);

        assert_eq!(options.name, "fs");
        assert_eq!(options.args.len(), 2);
        assert!(options.force);
    }
}
