//! The mmcp config file and the native agent config formats.

pub mod client_config;
pub mod named_map;
pub mod schema;
pub mod store;

pub use named_map::NamedMap;
pub use schema::{MmcpConfig, ServerDefinition, ServerMap, TemplateDefinition, TemplateMap};
pub use store::{ConfigStore, DEFAULT_CONFIG_FILE};
