//! Reconciliation of agent-native configs against a target server set.

pub mod json;
pub mod toml;

pub use json::reconcile_json;
pub use toml::{Patch, PatchValue, Scalar, Segment, apply_patches, build_patches, merge_toml};

/// How the target servers combine with what the agent already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Add or update the target servers; leave every other entry alone.
    #[default]
    Merge,
    /// Make the agent's server set exactly the target set.
    Replace,
}

impl ApplyMode {
    pub fn from_reset(reset: bool) -> Self {
        if reset {
            ApplyMode::Replace
        } else {
            ApplyMode::Merge
        }
    }
}

impl std::fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyMode::Merge => write!(f, "merge"),
            ApplyMode::Replace => write!(f, "replace"),
        }
    }
}
