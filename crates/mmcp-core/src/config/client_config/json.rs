//! JSON serializer for agent configuration files.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::{ConfigFormat, ConfigSerializer, NativeConfig, format_mismatch};
use crate::error::MmcpError;

/// JSON configuration file serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl ConfigSerializer for JsonSerializer {
    fn load(&self, path: &Path) -> Result<Option<NativeConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| MmcpError::invalid_agent_config(path.display().to_string(), e))?;
        match value {
            Value::Object(map) => Ok(Some(NativeConfig::Json(map))),
            _ => Err(MmcpError::invalid_agent_config(
                path.display().to_string(),
                "expected a JSON object at the root",
            )
            .into()),
        }
    }

    fn save(&self, path: &Path, config: &NativeConfig) -> Result<()> {
        let NativeConfig::Json(map) = config else {
            return Err(format_mismatch(path, ConfigFormat::Json));
        };
        let mut bytes = serde_json::to_vec_pretty(map).context("Failed to serialize JSON config")?;
        bytes.push(b'\n');
        crate::fs::write_atomic(path, &bytes)
    }

    fn format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }
}
