//! Error types raised by mmcp core operations.
//!
//! Pure logic (selection, reconciliation, registry lookups) returns these
//! directly. File-backed operations return `anyhow::Result` and wrap them with
//! context, so callers can still reach the variant with `downcast_ref`.

use std::fmt;
use std::path::PathBuf;

/// Why a server selection came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySelectionCause {
    /// The include/exclude filters matched nothing.
    Filters,
    /// A reset would leave the agent with no servers and `--allow-empty` was not given.
    Reset,
}

impl fmt::Display for EmptySelectionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptySelectionCause::Filters => {
                write!(f, "No target servers to apply. Use --servers or --exclude.")
            }
            EmptySelectionCause::Reset => write!(
                f,
                "Reset operation would result in empty configuration. Use --allow-empty to proceed."
            ),
        }
    }
}

/// mmcp domain errors.
#[derive(Debug, thiserror::Error)]
pub enum MmcpError {
    /// A `--template` name that is not defined in the config.
    #[error("Template not found: {0}.")]
    TemplateNotFound(String),

    /// Include and exclude filters were combined.
    #[error("{0}")]
    ConflictingFilter(String),

    /// Flags that only make sense together were used apart.
    #[error("{0}")]
    InvalidCombination(String),

    /// A reset was requested without saying which servers to keep.
    #[error("{0}")]
    MissingFilter(String),

    /// The selection resolved to no servers.
    #[error("{0}")]
    EmptySelection(EmptySelectionCause),

    /// One or more agent identifiers are not known to the registry.
    #[error("Unsupported agents: {}.", .0.join(", "))]
    UnsupportedAgent(Vec<String>),

    /// Neither the command line nor the config named any agent.
    #[error("No target agents specified. Use --agents or set agents in mmcp config.")]
    NoTargetAgents,

    /// Agents asked to be removed that the config does not list.
    #[error("Agents not registered in config: {}.", .0.join(", "))]
    AgentNotRegistered(Vec<String>),

    /// An agent's native config file could not be understood.
    #[error("Invalid agent config ({location}): {reason}")]
    InvalidAgentConfig { location: String, reason: String },

    /// A server field cannot be expressed in the agent's format.
    #[error("Unsupported field shape at '{path}': {reason}")]
    UnsupportedFieldShape { path: String, reason: String },

    /// An explicitly requested mmcp config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    ConfigFileNotFound(PathBuf),

    /// The mmcp config file failed to parse or validate.
    #[error("Invalid config file {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Server with name \"{0}\" already exists.")]
    ServerAlreadyExists(String),

    #[error("Server with name \"{0}\" does not exist.")]
    ServerNotFound(String),

    #[error("Invalid --env value: {0:?}. Use KEY=VALUE format.")]
    InvalidEnvAssignment(String),
}

impl MmcpError {
    pub(crate) fn invalid_agent_config(
        location: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        MmcpError::InvalidAgentConfig {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}
