//! Claude Desktop agent.

use super::{AgentAdapter, AgentKind, ConfigLocation, NativeFormat, PathRoot};

#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeDesktopAgent;

impl ClaudeDesktopAgent {
    pub fn new() -> Self {
        Self
    }
}

impl AgentAdapter for ClaudeDesktopAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::ClaudeDesktop
    }

    // Lives in the OS config dir rather than the home dir.
    fn location(&self) -> ConfigLocation {
        ConfigLocation::new(PathRoot::Config, "Claude/claude_desktop_config.json")
    }

    fn format(&self) -> NativeFormat {
        NativeFormat::Json {
            servers_key: "mcpServers",
        }
    }
}
