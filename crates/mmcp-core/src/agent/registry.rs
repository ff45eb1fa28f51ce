//! Agent registry: the set of agents `apply` can target, looked up by id.
//!
//! Built once by the caller and passed down; there is no global instance.

use crate::error::MmcpError;

use super::{
    AgentAdapter, claude_code::ClaudeCodeAgent, claude_desktop::ClaudeDesktopAgent,
    codex_cli::CodexCliAgent, cursor::CursorAgent, gemini_cli::GeminiCliAgent,
};

/// Registry of available agent adapters.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: Vec<Box<dyn AgentAdapter>>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::with_default_agents()
    }
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { agents: Vec::new() }
    }

    /// Create a registry with all built-in agents.
    pub fn with_default_agents() -> Self {
        let agents: Vec<Box<dyn AgentAdapter>> = vec![
            Box::new(ClaudeCodeAgent::new()),
            Box::new(ClaudeDesktopAgent::new()),
            Box::new(CodexCliAgent::new()),
            Box::new(CursorAgent::new()),
            Box::new(GeminiCliAgent::new()),
        ];
        Self { agents }
    }

    /// Register an agent adapter. An adapter with the same id replaces the old one.
    pub fn register(&mut self, agent: Box<dyn AgentAdapter>) {
        self.agents.retain(|existing| existing.id() != agent.id());
        self.agents.push(agent);
    }

    pub fn all(&self) -> &[Box<dyn AgentAdapter>] {
        &self.agents
    }

    pub fn get(&self, id: &str) -> Option<&dyn AgentAdapter> {
        self.agents
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// List all agent IDs in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.agents.iter().map(|a| a.id()).collect()
    }

    /// Check that every id is registered; unknown ids are reported together.
    pub fn validate<S: AsRef<str>>(&self, ids: &[S]) -> Result<(), MmcpError> {
        let unknown: Vec<String> = ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| !self.contains(id))
            .map(str::to_string)
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(MmcpError::UnsupportedAgent(unknown))
        }
    }

    /// Look up adapters for `ids`, in the given order. Repeated ids resolve once.
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<&dyn AgentAdapter>, MmcpError> {
        self.validate(ids)?;
        let mut agents: Vec<&dyn AgentAdapter> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if agents.iter().any(|agent| agent.id() == id) {
                continue;
            }
            if let Some(agent) = self.get(id) {
                agents.push(agent);
            }
        }
        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentKind, ConfigLocation, NativeFormat, PathRoot};

    #[test]
    fn test_default_agents_registered() {
        let registry = AgentRegistry::with_default_agents();

        assert_eq!(
            registry.ids(),
            vec![
                "claude-code",
                "claude-desktop",
                "codex-cli",
                "cursor",
                "gemini-cli"
            ]
        );
    }

    #[test]
    fn test_get_agent_by_id() {
        let registry = AgentRegistry::with_default_agents();

        let codex = registry.get("codex-cli").expect("agent exists");
        assert_eq!(codex.kind(), AgentKind::CodexCli);
        assert!(matches!(codex.format(), NativeFormat::Toml { .. }));

        assert!(registry.get("vscode").is_none());
    }

    #[test]
    fn test_resolve_reports_every_unknown_id() {
        let registry = AgentRegistry::with_default_agents();

        let err = registry
            .resolve(&["cursor", "vim", "claude-code", "emacs"])
            .unwrap_err();

        assert_eq!(err.to_string(), "Unsupported agents: vim, emacs.");
    }

    #[test]
    fn test_resolve_keeps_requested_order() {
        let registry = AgentRegistry::with_default_agents();

        let agents = registry.resolve(&["gemini-cli", "claude-code"]).expect("resolve");
        let ids: Vec<_> = agents.iter().map(|a| a.id()).collect();

        assert_eq!(ids, vec!["gemini-cli", "claude-code"]);
    }

    #[test]
    fn test_resolve_skips_repeated_ids() {
        let registry = AgentRegistry::with_default_agents();

        let agents = registry
            .resolve(&["cursor", "codex-cli", "cursor"])
            .expect("resolve");
        let ids: Vec<_> = agents.iter().map(|a| a.id()).collect();

        assert_eq!(ids, vec!["cursor", "codex-cli"]);
    }

    #[derive(Debug)]
    struct ProjectCursor;

    impl AgentAdapter for ProjectCursor {
        fn kind(&self) -> AgentKind {
            AgentKind::Cursor
        }

        fn location(&self) -> ConfigLocation {
            ConfigLocation::new(PathRoot::Home, "project/.cursor/mcp.json")
        }

        fn format(&self) -> NativeFormat {
            NativeFormat::Json {
                servers_key: "mcpServers",
            }
        }
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = AgentRegistry::with_default_agents();
        registry.register(Box::new(ProjectCursor));

        assert_eq!(registry.all().len(), 5);
        let cursor = registry.get("cursor").expect("exists");
        assert_eq!(
            cursor.location().relative_path,
            std::path::PathBuf::from("project/.cursor/mcp.json")
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = AgentRegistry::new();

        assert!(registry.all().is_empty());
        assert!(registry.get("claude-code").is_none());
        assert!(registry.validate::<&str>(&[]).is_ok());
    }
}
