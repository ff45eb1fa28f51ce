//! Reading and writing agent-native configuration files.
//!
//! Two on-disk formats are supported. JSON files are parsed into an ordered
//! `serde_json::Map` and pretty-printed on save. TOML files are kept as raw
//! text so that the minimal-patch reconciler can edit them without losing
//! comments or layout; loading only checks that the text parses.

mod json;
mod toml;

use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};

pub use json::JsonSerializer;
pub use toml::TomlSerializer;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

/// In-memory form of one agent's config file.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeConfig {
    Json(Map<String, Value>),
    Toml(String),
}

impl NativeConfig {
    pub fn format(&self) -> ConfigFormat {
        match self {
            NativeConfig::Json(_) => ConfigFormat::Json,
            NativeConfig::Toml(_) => ConfigFormat::Toml,
        }
    }
}

/// Trait for loading and saving agent configuration files.
pub trait ConfigSerializer: Send + Sync {
    /// Load a configuration file.
    ///
    /// Returns `None` if the file does not exist.
    fn load(&self, path: &Path) -> Result<Option<NativeConfig>>;

    /// Save a configuration atomically, creating parent directories.
    fn save(&self, path: &Path, config: &NativeConfig) -> Result<()>;

    /// Get the format this serializer handles.
    fn format(&self) -> ConfigFormat;
}

/// Create a serializer for the given format.
pub fn serializer_for_format(format: ConfigFormat) -> Box<dyn ConfigSerializer> {
    match format {
        ConfigFormat::Json => Box::new(JsonSerializer),
        ConfigFormat::Toml => Box::new(TomlSerializer),
    }
}

fn format_mismatch(path: &Path, expected: ConfigFormat) -> anyhow::Error {
    anyhow::anyhow!(
        "Refusing to write non-{:?} config to {}",
        expected,
        path.display()
    )
}
