//! Cursor agent: global MCP config at `~/.cursor/mcp.json`.

use super::{AgentAdapter, AgentKind, ConfigLocation, NativeFormat, PathRoot};

#[derive(Debug, Default, Clone, Copy)]
pub struct CursorAgent;

impl CursorAgent {
    pub fn new() -> Self {
        Self
    }
}

impl AgentAdapter for CursorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Cursor
    }

    fn location(&self) -> ConfigLocation {
        ConfigLocation::new(PathRoot::Home, ".cursor/mcp.json")
    }

    fn format(&self) -> NativeFormat {
        NativeFormat::Json {
            servers_key: "mcpServers",
        }
    }
}
