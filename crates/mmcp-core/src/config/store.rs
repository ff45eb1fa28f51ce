//! Config store for loading and saving `~/.mmcp.json`.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::MmcpConfig;
use crate::error::MmcpError;

/// File name of the mmcp config in the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".mmcp.json";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigStore {
    /// Store for `~/.mmcp.json` of the current user.
    pub fn from_home() -> anyhow::Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(Self::default_in(&home_dir))
    }

    /// Store for the default config file under `home_dir`. A missing file loads as empty.
    pub fn default_in(home_dir: &Path) -> Self {
        Self {
            config_path: home_dir.join(DEFAULT_CONFIG_FILE),
            explicit: false,
        }
    }

    /// Store for a user-supplied path. A missing file is an error on load.
    pub fn explicit(config_path: PathBuf) -> Self {
        Self {
            config_path,
            explicit: true,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn load(&self) -> anyhow::Result<MmcpConfig> {
        if !self.config_path.exists() {
            if self.explicit {
                return Err(MmcpError::ConfigFileNotFound(self.config_path.clone()).into());
            }
            tracing::debug!(
                path = %self.config_path.display(),
                "config file missing, using empty config"
            );
            return Ok(MmcpConfig::new());
        }

        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        let config = serde_json::from_str(&content).map_err(|e| MmcpError::InvalidConfig {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Write the config as two-space indented JSON with a trailing newline.
    pub fn save(&self, config: &MmcpConfig) -> anyhow::Result<()> {
        let mut content =
            serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")?;
        content.push('\n');
        crate::fs::write_atomic(&self.config_path, content.as_bytes())?;
        tracing::debug!(path = %self.config_path.display(), "saved config");
        Ok(())
    }
}
