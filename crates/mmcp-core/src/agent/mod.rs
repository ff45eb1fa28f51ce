//! Agent adapter layer.
//!
//! Each supported agent knows where its config file lives and which format
//! it uses. Loading, reconciling and saving are shared through default
//! methods on [`AgentAdapter`], driven by [`AgentAdapter::format`].

mod claude_code;
mod claude_desktop;
mod codex_cli;
mod cursor;
mod gemini_cli;
pub mod registry;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::config::ServerMap;
use crate::config::client_config::{ConfigFormat, NativeConfig, serializer_for_format};
use crate::error::MmcpError;
use crate::reconcile::{ApplyMode, merge_toml, reconcile_json};

pub use claude_code::ClaudeCodeAgent;
pub use claude_desktop::ClaudeDesktopAgent;
pub use codex_cli::CodexCliAgent;
pub use cursor::CursorAgent;
pub use gemini_cli::GeminiCliAgent;
pub use registry::AgentRegistry;

/// Built-in agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    ClaudeCode,
    ClaudeDesktop,
    CodexCli,
    Cursor,
    GeminiCli,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::ClaudeCode,
        AgentKind::ClaudeDesktop,
        AgentKind::CodexCli,
        AgentKind::Cursor,
        AgentKind::GeminiCli,
    ];

    /// Identifiers accepted on the command line and in `agents`.
    pub const IDS: [&'static str; 5] = [
        "claude-code",
        "claude-desktop",
        "codex-cli",
        "cursor",
        "gemini-cli",
    ];

    pub fn id(self) -> &'static str {
        match self {
            AgentKind::ClaudeCode => "claude-code",
            AgentKind::ClaudeDesktop => "claude-desktop",
            AgentKind::CodexCli => "codex-cli",
            AgentKind::Cursor => "cursor",
            AgentKind::GeminiCli => "gemini-cli",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Directories agent config paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentContext {
    pub home_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl AgentContext {
    pub fn new(home_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            home_dir,
            config_dir,
        }
    }

    /// Context for the current user.
    pub fn from_env() -> anyhow::Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        let config_dir = dirs::config_dir().unwrap_or_else(|| home_dir.join(".config"));
        Ok(Self::new(home_dir, config_dir))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot {
    /// The user's home directory
    Home,
    /// The OS per-user config directory (`~/.config`, `~/Library/Application Support`, `%APPDATA%`)
    Config,
}

/// Where an agent keeps its config, relative to a [`PathRoot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub root: PathRoot,
    pub relative_path: PathBuf,
}

impl ConfigLocation {
    pub fn new(root: PathRoot, relative_path: impl AsRef<Path>) -> Self {
        Self {
            root,
            relative_path: relative_path.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, ctx: &AgentContext) -> PathBuf {
        let base = match self.root {
            PathRoot::Home => &ctx.home_dir,
            PathRoot::Config => &ctx.config_dir,
        };
        base.join(&self.relative_path)
    }
}

/// How an agent stores its servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFormat {
    /// A JSON object with the servers under `servers_key`
    Json { servers_key: &'static str },
    /// A TOML document with one `[servers_table.<name>]` table per server
    Toml { servers_table: &'static str },
}

impl NativeFormat {
    pub fn config_format(self) -> ConfigFormat {
        match self {
            NativeFormat::Json { .. } => ConfigFormat::Json,
            NativeFormat::Toml { .. } => ConfigFormat::Toml,
        }
    }

    /// Config used when the agent has no file yet.
    pub fn empty(self) -> NativeConfig {
        match self {
            NativeFormat::Json { servers_key } => {
                let mut map = Map::new();
                map.insert(servers_key.to_string(), Value::Object(Map::new()));
                NativeConfig::Json(map)
            }
            NativeFormat::Toml { .. } => NativeConfig::Toml(String::new()),
        }
    }
}

/// Outcome of applying servers to one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentApplyResult {
    pub agent: &'static str,
    pub path: PathBuf,
    pub mode: ApplyMode,
    /// False when the file already matched and was not rewritten.
    pub changed: bool,
}

/// Trait for agent-specific configuration adapters
pub trait AgentAdapter: Send + Sync + fmt::Debug {
    fn kind(&self) -> AgentKind;

    fn location(&self) -> ConfigLocation;

    fn format(&self) -> NativeFormat;

    fn id(&self) -> &'static str {
        self.kind().id()
    }

    fn config_path(&self, ctx: &AgentContext) -> PathBuf {
        self.location().resolve(ctx)
    }

    /// Read the agent's config, or an empty one if the file does not exist.
    fn load(&self, ctx: &AgentContext) -> anyhow::Result<NativeConfig> {
        let path = self.config_path(ctx);
        let format = self.format();
        let loaded = serializer_for_format(format.config_format()).load(&path)?;
        Ok(loaded.unwrap_or_else(|| format.empty()))
    }

    fn reconcile(
        &self,
        native: NativeConfig,
        servers: &ServerMap,
        mode: ApplyMode,
    ) -> Result<NativeConfig, MmcpError> {
        match (self.format(), native) {
            (NativeFormat::Json { servers_key }, NativeConfig::Json(map)) => {
                reconcile_json(map, servers_key, servers, mode).map(NativeConfig::Json)
            }
            (NativeFormat::Toml { servers_table }, NativeConfig::Toml(text)) => {
                if mode == ApplyMode::Replace {
                    tracing::warn!(
                        agent = self.id(),
                        "replace is not supported for TOML configs, merging instead"
                    );
                }
                merge_toml(&text, servers_table, servers).map(NativeConfig::Toml)
            }
            (format, native) => Err(MmcpError::invalid_agent_config(
                self.id(),
                format!(
                    "expected {:?} config, got {:?}",
                    format.config_format(),
                    native.format()
                ),
            )),
        }
    }

    fn save(&self, ctx: &AgentContext, native: &NativeConfig) -> anyhow::Result<()> {
        let path = self.config_path(ctx);
        serializer_for_format(self.format().config_format()).save(&path, native)
    }

    /// Load, reconcile and save. The file is left alone when nothing changed.
    fn apply_config(
        &self,
        ctx: &AgentContext,
        servers: &ServerMap,
        mode: ApplyMode,
    ) -> anyhow::Result<AgentApplyResult> {
        let path = self.config_path(ctx);
        let current = self.load(ctx)?;
        let updated = self
            .reconcile(current.clone(), servers, mode)
            .with_context(|| format!("Failed to reconcile config file: {}", path.display()))?;

        let changed = updated != current;
        if changed {
            self.save(ctx, &updated)?;
            tracing::info!(
                agent = self.id(),
                path = %path.display(),
                %mode,
                "updated agent config"
            );
        } else {
            tracing::debug!(agent = self.id(), path = %path.display(), "agent config unchanged");
        }

        Ok(AgentApplyResult {
            agent: self.id(),
            path,
            mode,
            changed,
        })
    }
}
