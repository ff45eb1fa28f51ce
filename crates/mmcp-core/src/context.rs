//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::agent::AgentContext;
use crate::config::{ConfigStore, DEFAULT_CONFIG_FILE};

/// Paths shared by every command.
///
/// Frontends create this once and pass it to commands. Tests build it from
/// temp directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    home_dir: PathBuf,
    config_dir: PathBuf,
}

impl AppContext {
    pub fn new(home_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            home_dir,
            config_dir,
        }
    }

    /// Context for the current user, from the OS directories.
    pub fn from_env() -> anyhow::Result<Self> {
        let agent_ctx = AgentContext::from_env()?;
        Ok(Self::new(agent_ctx.home_dir, agent_ctx.config_dir))
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn default_config_path(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_CONFIG_FILE)
    }

    /// Get an AgentContext for adapter calls.
    pub fn agent_context(&self) -> AgentContext {
        AgentContext::new(self.home_dir.clone(), self.config_dir.clone())
    }

    /// Get the ConfigStore for `--config`, or the default `~/.mmcp.json`.
    ///
    /// Naming the default path explicitly behaves like not naming it.
    pub fn config_store(&self, explicit: Option<&Path>) -> ConfigStore {
        match explicit {
            Some(path) if path != self.default_config_path() => {
                ConfigStore::explicit(path.to_path_buf())
            }
            _ => ConfigStore::default_in(&self.home_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AppContext {
        AppContext::new(PathBuf::from("/home/u"), PathBuf::from("/home/u/.config"))
    }

    #[test]
    fn test_config_store_defaults_to_home() {
        let store = ctx().config_store(None);

        assert_eq!(store.config_path(), Path::new("/home/u/.mmcp.json"));
        assert!(!store.is_explicit());
    }

    #[test]
    fn test_explicit_default_path_is_not_explicit() {
        let store = ctx().config_store(Some(Path::new("/home/u/.mmcp.json")));
        assert!(!store.is_explicit());
    }

    #[test]
    fn test_explicit_other_path() {
        let store = ctx().config_store(Some(Path::new("/tmp/team.json")));

        assert!(store.is_explicit());
        assert_eq!(store.config_path(), Path::new("/tmp/team.json"));
    }

    #[test]
    fn test_agent_context_carries_dirs() {
        let agent_ctx = ctx().agent_context();

        assert_eq!(agent_ctx.home_dir, PathBuf::from("/home/u"));
        assert_eq!(agent_ctx.config_dir, PathBuf::from("/home/u/.config"));
    }
}
