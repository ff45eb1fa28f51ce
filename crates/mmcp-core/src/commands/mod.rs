//! High-level commands for mmcp operations.
//!
//! Commands load and save the mmcp config through a [`ConfigStore`] and
//! return reports. They never print; frontends decide how to show results.
//!
//! [`ConfigStore`]: crate::config::ConfigStore

pub mod agents;
pub mod apply;
pub mod servers;

pub use agents::{AgentsCommand, AgentsReport};
pub use apply::{ApplyCommand, ApplyOptions, ApplyReport};
pub use servers::{AddServerOptions, ServerCommand, ServerEntry, ServerReport, parse_env_assignment};
