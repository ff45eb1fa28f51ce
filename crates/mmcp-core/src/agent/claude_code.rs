//! Claude Code agent: servers live under `mcpServers` in `~/.claude.json`.
//!
//! The same file holds Claude Code's project history and preferences, so
//! everything outside `mcpServers` must survive untouched.

use super::{AgentAdapter, AgentKind, ConfigLocation, NativeFormat, PathRoot};

#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeCodeAgent;

impl ClaudeCodeAgent {
    pub fn new() -> Self {
        Self
    }
}

impl AgentAdapter for ClaudeCodeAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::ClaudeCode
    }

    fn location(&self) -> ConfigLocation {
        ConfigLocation::new(PathRoot::Home, ".claude.json")
    }

    fn format(&self) -> NativeFormat {
        NativeFormat::Json {
            servers_key: "mcpServers",
        }
    }
}
