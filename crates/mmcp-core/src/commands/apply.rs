//! Apply command implementation.
//!
//! Selects servers from the mmcp config and writes them into each target
//! agent's config, one agent at a time.

use anyhow::Context;

use crate::agent::{AgentApplyResult, AgentContext, AgentRegistry};
use crate::config::ConfigStore;
use crate::error::MmcpError;
use crate::reconcile::ApplyMode;
use crate::selector::{ServerFilterInput, resolve_server_filters, resolve_target_servers};

/// Options for the apply command
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Agents to apply to (empty = the `agents` list from the config)
    pub agents: Vec<String>,
    /// Server filter flags
    pub filter: ServerFilterInput,
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(mut self, agents: Vec<String>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_filter(mut self, filter: ServerFilterInput) -> Self {
        self.filter = filter;
        self
    }
}

/// Result of an apply run
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Names of the applied servers, in selection order
    pub servers: Vec<String>,
    pub mode: ApplyMode,
    /// One entry per agent, in the order they were applied
    pub agents: Vec<AgentApplyResult>,
}

impl ApplyReport {
    /// Whether any agent file was rewritten.
    pub fn changed(&self) -> bool {
        self.agents.iter().any(|a| a.changed)
    }
}

/// Apply command orchestrator
#[derive(Debug)]
pub struct ApplyCommand {
    store: ConfigStore,
    agent_ctx: AgentContext,
}

impl ApplyCommand {
    pub fn new(store: ConfigStore, agent_ctx: AgentContext) -> Self {
        Self { store, agent_ctx }
    }

    pub fn run(
        &self,
        registry: &AgentRegistry,
        options: &ApplyOptions,
    ) -> anyhow::Result<ApplyReport> {
        self.run_with(registry, options, |_| {})
    }

    /// Run the command, calling `on_agent` after each agent is written.
    ///
    /// Every agent id is validated and the server selection resolved before
    /// any file is touched. A failing agent stops the run; agents written
    /// before it keep their changes.
    pub fn run_with<F>(
        &self,
        registry: &AgentRegistry,
        options: &ApplyOptions,
        mut on_agent: F,
    ) -> anyhow::Result<ApplyReport>
    where
        F: FnMut(&AgentApplyResult),
    {
        let config = self.store.load()?;

        let agent_ids = if options.agents.is_empty() {
            config.agents.clone()
        } else {
            options.agents.clone()
        };
        if agent_ids.is_empty() {
            return Err(MmcpError::NoTargetAgents.into());
        }
        let agents = registry.resolve(agent_ids.as_slice())?;

        let filters = resolve_server_filters(&config, &options.filter)?;
        let servers = resolve_target_servers(&config, &filters)?;
        let mode = ApplyMode::from_reset(filters.reset);
        tracing::debug!(
            agents = ?agent_ids,
            servers = servers.len(),
            %mode,
            "applying servers"
        );

        let mut results = Vec::with_capacity(agents.len());
        for agent in agents {
            let result = agent
                .apply_config(&self.agent_ctx, &servers, mode)
                .with_context(|| format!("Failed to apply config to agent '{}'", agent.id()))?;
            on_agent(&result);
            results.push(result);
        }

        Ok(ApplyReport {
            servers: servers.names().map(str::to_string).collect(),
            mode,
            agents: results,
        })
    }
}
