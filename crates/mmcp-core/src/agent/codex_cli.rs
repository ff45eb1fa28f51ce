//! Codex CLI agent.
//!
//! Codex reads `~/.codex/config.toml`, one `[mcp_servers.<name>]` table per
//! server. The file is patched in place so comments and unrelated settings
//! are kept.

use super::{AgentAdapter, AgentKind, ConfigLocation, NativeFormat, PathRoot};

#[derive(Debug, Default, Clone, Copy)]
pub struct CodexCliAgent;

impl CodexCliAgent {
    pub fn new() -> Self {
        Self
    }
}

impl AgentAdapter for CodexCliAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::CodexCli
    }

    fn location(&self) -> ConfigLocation {
        ConfigLocation::new(PathRoot::Home, ".codex/config.toml")
    }

    fn format(&self) -> NativeFormat {
        NativeFormat::Toml {
            servers_table: "mcp_servers",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentContext;
    use crate::config::{ServerDefinition, ServerMap};
    use crate::reconcile::ApplyMode;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> AgentContext {
        AgentContext::new(temp.path().to_path_buf(), temp.path().join(".config"))
    }

    #[test]
    fn replace_falls_back_to_merge() {
        let temp = TempDir::new().expect("create temp dir");
        let ctx = context(&temp);
        let path = CodexCliAgent.config_path(&ctx);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[mcp_servers.keep]\ncommand = \"keep\"\n").unwrap();

        let mut servers = ServerMap::new();
        servers.insert("new", ServerDefinition::stdio("new", vec![], vec![]));
        CodexCliAgent
            .apply_config(&ctx, &servers, ApplyMode::Replace)
            .expect("apply");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[mcp_servers.keep]\ncommand = \"keep\"\n\n[mcp_servers.new]\ncommand = \"new\"\nargs = []\n"
        );
    }

    #[test]
    fn second_apply_is_unchanged() {
        let temp = TempDir::new().expect("create temp dir");
        let ctx = context(&temp);

        let mut servers = ServerMap::new();
        servers.insert(
            "ctx",
            ServerDefinition::stdio("npx", vec!["-y".into(), "ctx".into()], vec![]),
        );
        let first = CodexCliAgent
            .apply_config(&ctx, &servers, ApplyMode::Merge)
            .expect("first apply");
        let second = CodexCliAgent
            .apply_config(&ctx, &servers, ApplyMode::Merge)
            .expect("second apply");

        assert!(first.changed);
        assert!(!second.changed);
    }
}
