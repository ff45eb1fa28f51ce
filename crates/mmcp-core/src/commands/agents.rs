//! Agents commands: manage the default `agents` list in the mmcp config.

use crate::agent::AgentRegistry;
use crate::config::ConfigStore;
use crate::error::MmcpError;

/// Result of an agents add/remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentsReport {
    /// Ids actually added or removed
    pub affected: Vec<String>,
    /// The `agents` list after the command
    pub agents: Vec<String>,
    pub changed: bool,
}

/// Agents command orchestrator
#[derive(Debug)]
pub struct AgentsCommand {
    store: ConfigStore,
}

impl AgentsCommand {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    /// Append agents not already listed, keeping their first-given order.
    pub fn add(&self, registry: &AgentRegistry, names: &[String]) -> anyhow::Result<AgentsReport> {
        registry.validate(names)?;

        let mut config = self.store.load()?;
        let mut affected = Vec::new();
        for name in names {
            if !config.agents.contains(name) && !affected.contains(name) {
                affected.push(name.clone());
            }
        }

        let changed = !affected.is_empty();
        if changed {
            config.agents.extend(affected.iter().cloned());
            self.store.save(&config)?;
        }

        Ok(AgentsReport {
            affected,
            agents: config.agents,
            changed,
        })
    }

    /// Remove agents from the list. Every name must currently be listed.
    pub fn remove(
        &self,
        registry: &AgentRegistry,
        names: &[String],
    ) -> anyhow::Result<AgentsReport> {
        registry.validate(names)?;

        let mut config = self.store.load()?;
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !config.agents.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(MmcpError::AgentNotRegistered(missing).into());
        }

        config.agents.retain(|agent| !names.contains(agent));
        self.store.save(&config)?;

        let mut affected = Vec::new();
        for name in names {
            if !affected.contains(name) {
                affected.push(name.clone());
            }
        }
        Ok(AgentsReport {
            affected,
            agents: config.agents,
            changed: true,
        })
    }

    /// The `agents` list in config order.
    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.store.load()?.agents)
    }

    /// The `agents` list sorted by id.
    pub fn list_sorted(&self) -> anyhow::Result<Vec<String>> {
        let mut agents = self.list()?;
        agents.sort();
        Ok(agents)
    }
}
