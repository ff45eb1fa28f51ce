//! mmcp core library
//!
//! Keeps one list of MCP servers in `~/.mmcp.json` and reconciles it into
//! the native config files of each supported agent, preserving whatever the
//! agent (or its user) keeps there besides the servers.

pub mod agent;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod reconcile;
pub mod selector;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigStore, MmcpConfig, ServerDefinition, ServerMap, TemplateDefinition,
    };
    pub use crate::context::AppContext;
    pub use crate::error::MmcpError;

    // Agents
    pub use crate::agent::{
        AgentAdapter, AgentApplyResult, AgentContext, AgentKind, AgentRegistry,
    };

    // Selection and reconciliation
    pub use crate::reconcile::ApplyMode;
    pub use crate::selector::{ServerFilterInput, ServerFilterOptions};

    // Commands
    pub use crate::commands::{
        AddServerOptions, AgentsCommand, ApplyCommand, ApplyOptions, ServerCommand,
    };
}
