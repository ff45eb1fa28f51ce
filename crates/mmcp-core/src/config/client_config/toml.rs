//! TOML serializer for agent configuration files.

use std::path::Path;

use anyhow::{Context, Result};
use toml_edit::DocumentMut;

use super::{ConfigFormat, ConfigSerializer, NativeConfig, format_mismatch};
use crate::error::MmcpError;

/// TOML configuration file serializer. The text itself is the in-memory form.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlSerializer;

impl ConfigSerializer for TomlSerializer {
    fn load(&self, path: &Path) -> Result<Option<NativeConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        content
            .parse::<DocumentMut>()
            .map_err(|e| MmcpError::invalid_agent_config(path.display().to_string(), e))?;
        Ok(Some(NativeConfig::Toml(content)))
    }

    fn save(&self, path: &Path, config: &NativeConfig) -> Result<()> {
        let NativeConfig::Toml(content) = config else {
            return Err(format_mismatch(path, ConfigFormat::Toml));
        };
        crate::fs::write_atomic(path, content.as_bytes())
    }

    fn format(&self) -> ConfigFormat {
        ConfigFormat::Toml
    }
}
