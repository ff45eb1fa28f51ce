//! Configuration schema for the mmcp config file (`~/.mmcp.json`).
//!
//! The file holds three top-level keys, all optional:
//! - `agents`: agent identifiers targeted by default
//! - `mcpServers`: named MCP server definitions
//! - `templates`: named server filters

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::named_map::NamedMap;

/// Ordered map of server name to definition.
pub type ServerMap = NamedMap<ServerDefinition>;

/// Ordered map of template name to definition.
pub type TemplateMap = NamedMap<TemplateDefinition>;

/// Root configuration structure for the mmcp config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MmcpConfig {
    /// Agents applied to when `--agents` is not given
    #[serde(default, deserialize_with = "deserialize_agents")]
    pub agents: Vec<String>,

    /// MCP server definitions
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: ServerMap,

    /// Reusable server filters
    #[serde(default)]
    pub templates: TemplateMap,
}

impl MmcpConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

fn deserialize_agents<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    use serde::de::Error as _;

    let raw = Vec::<String>::deserialize(deserializer)?;
    let mut seen = HashSet::new();
    let mut agents = Vec::with_capacity(raw.len());
    for id in raw {
        if id.is_empty() {
            return Err(D::Error::custom("agent identifiers must not be empty"));
        }
        if seen.insert(id.clone()) {
            agents.push(id);
        }
    }
    Ok(agents)
}

/// A single MCP server definition.
///
/// Stored as the ordered field map read from the file so that fields mmcp does
/// not know about round-trip untouched. The well-known fields are validated on
/// construction:
/// - `command`: non-empty string
/// - `args`: array of non-empty strings
/// - `env`: object of string values with non-empty keys
/// - `url`: absolute URL
///
/// A `null` field is kept as an explicit "unset" marker: reconcilers remove the
/// field from the agent's entry instead of writing a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ServerDefinition {
    fields: Map<String, Value>,
}

impl ServerDefinition {
    /// Build a local (stdio) server definition.
    pub fn stdio(
        command: impl Into<String>,
        args: Vec<String>,
        env: Vec<(String, String)>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("command".to_string(), Value::String(command.into()));
        fields.insert(
            "args".to_string(),
            Value::Array(args.into_iter().map(Value::String).collect()),
        );
        if !env.is_empty() {
            let env: Map<String, Value> = env
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            fields.insert("env".to_string(), Value::Object(env));
        }
        Self { fields }
    }

    /// Build a remote server definition.
    pub fn remote(url: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("url".to_string(), Value::String(url.into()));
        Self { fields }
    }

    /// All fields in file order, including ones mmcp does not interpret.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn command(&self) -> Option<&str> {
        self.fields.get("command").and_then(Value::as_str)
    }

    pub fn args(&self) -> Vec<&str> {
        self.fields
            .get("args")
            .and_then(Value::as_array)
            .map(|args| args.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn env(&self) -> Vec<(&str, &str)> {
        self.fields
            .get("env")
            .and_then(Value::as_object)
            .map(|env| {
                env.iter()
                    .filter_map(|(key, value)| value.as_str().map(|v| (key.as_str(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn url(&self) -> Option<&str> {
        self.fields.get("url").and_then(Value::as_str)
    }

    /// One-line description used by `mmcp list`.
    pub fn summary(&self) -> String {
        match (self.command(), self.url()) {
            (Some(command), _) => std::iter::once(command)
                .chain(self.args())
                .collect::<Vec<_>>()
                .join(" "),
            (None, Some(url)) => url.to_string(),
            (None, None) => String::new(),
        }
    }
}

impl TryFrom<Map<String, Value>> for ServerDefinition {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        validate_server_fields(&fields)?;
        Ok(Self { fields })
    }
}

impl From<ServerDefinition> for Map<String, Value> {
    fn from(server: ServerDefinition) -> Self {
        server.fields
    }
}

fn validate_server_fields(fields: &Map<String, Value>) -> Result<(), String> {
    match fields.get("command") {
        None | Some(Value::Null) => {}
        Some(Value::String(command)) if !command.is_empty() => {}
        Some(_) => return Err("'command' must be a non-empty string".to_string()),
    }

    match fields.get("args") {
        None | Some(Value::Null) => {}
        Some(Value::Array(args)) => {
            if !args
                .iter()
                .all(|arg| arg.as_str().is_some_and(|s| !s.is_empty()))
            {
                return Err("'args' must contain only non-empty strings".to_string());
            }
        }
        Some(_) => return Err("'args' must be an array of strings".to_string()),
    }

    match fields.get("env") {
        None | Some(Value::Null) => {}
        Some(Value::Object(env)) => {
            for (key, value) in env {
                if key.is_empty() {
                    return Err("'env' keys must not be empty".to_string());
                }
                if !value.is_string() {
                    return Err(format!("'env.{key}' must be a string"));
                }
            }
        }
        Some(_) => return Err("'env' must be an object of strings".to_string()),
    }

    match fields.get("url") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) => {
            url::Url::parse(raw).map_err(|e| format!("'url' is not a valid URL: {e}"))?;
        }
        Some(_) => return Err("'url' must be a string".to_string()),
    }

    Ok(())
}

/// A named, reusable server filter: either an allow-list or a deny-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TemplateEntry", into = "TemplateEntry")]
pub enum TemplateDefinition {
    /// Apply only these servers
    Servers(Vec<String>),
    /// Apply every server except these
    Exclude(Vec<String>),
}

/// On-disk shape of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TemplateEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    servers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclude: Option<Vec<String>>,
}

impl TryFrom<TemplateEntry> for TemplateDefinition {
    type Error = String;

    fn try_from(entry: TemplateEntry) -> Result<Self, Self::Error> {
        let template = match (entry.servers, entry.exclude) {
            (Some(servers), None) => TemplateDefinition::Servers(servers),
            (None, Some(exclude)) => TemplateDefinition::Exclude(exclude),
            (Some(_), Some(_)) => {
                return Err("Template cannot define both servers and exclude.".to_string());
            }
            (None, None) => {
                return Err("Template must define either servers or exclude.".to_string());
            }
        };
        if template.names().iter().any(String::is_empty) {
            return Err("Template server names must not be empty.".to_string());
        }
        Ok(template)
    }
}

impl From<TemplateDefinition> for TemplateEntry {
    fn from(template: TemplateDefinition) -> Self {
        match template {
            TemplateDefinition::Servers(servers) => TemplateEntry {
                servers: Some(servers),
                exclude: None,
            },
            TemplateDefinition::Exclude(exclude) => TemplateEntry {
                servers: None,
                exclude: Some(exclude),
            },
        }
    }
}

impl TemplateDefinition {
    pub fn names(&self) -> &[String] {
        match self {
            TemplateDefinition::Servers(names) | TemplateDefinition::Exclude(names) => names,
        }
    }
}
