//! Gemini CLI agent.
//!
//! `~/.gemini/settings.json` also carries theme, auth and tool settings;
//! only `mcpServers` is reconciled.

use super::{AgentAdapter, AgentKind, ConfigLocation, NativeFormat, PathRoot};

#[derive(Debug, Default, Clone, Copy)]
pub struct GeminiCliAgent;

impl GeminiCliAgent {
    pub fn new() -> Self {
        Self
    }
}

impl AgentAdapter for GeminiCliAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::GeminiCli
    }

    fn location(&self) -> ConfigLocation {
        ConfigLocation::new(PathRoot::Home, ".gemini/settings.json")
    }

    fn format(&self) -> NativeFormat {
        NativeFormat::Json {
            servers_key: "mcpServers",
        }
    }
}
