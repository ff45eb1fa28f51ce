//! mmcp - manage MCP server definitions in one place and apply them to agents
//!
//! Usage:
//!   mmcp add <name> <command> [args...]   # Add a server to ~/.mmcp.json
//!   mmcp apply --agents cursor            # Write servers into agent configs
//!   mmcp agents add claude-code           # Set default apply targets

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mmcp_core::agent::{AgentApplyResult, AgentKind, AgentRegistry};
use mmcp_core::commands::{
    AddServerOptions, AgentsCommand, ApplyCommand, ApplyOptions, ServerCommand,
};
use mmcp_core::context::AppContext;
use mmcp_core::selector::ServerFilterInput;

#[derive(Parser)]
#[command(name = "mmcp", version)]
#[command(
    about = "Manage your MCP (Model Context Protocol) server definitions in one place and apply them to supported agents.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to config file (default: ~/.mmcp.json)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a mcp server
    Add {
        /// Name of the server
        name: String,

        /// Command to start the server
        command: String,

        /// Arguments for the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Environment variables for the server
        #[arg(short, long, value_name = "KEY=VALUE", num_args = 1..)]
        env: Vec<String>,

        /// Overwrite if the server already exists
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Remove a mcp server
    #[command(alias = "rm")]
    Remove {
        /// Name of the server
        name: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Apply mmcp config to agents
    Apply(ApplyArgs),

    /// List configured mcp servers
    List {
        /// Output mcpServers as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Manage apply target agents
    Agents(AgentsArgs),
}

#[derive(Args)]
struct ApplyArgs {
    /// Target agents (default: agents from the config)
    #[arg(
        long,
        value_name = "NAME",
        num_args = 1..,
        value_parser = PossibleValuesParser::new(AgentKind::IDS)
    )]
    agents: Vec<String>,

    /// Apply only the specified servers (ALL for every server)
    #[arg(long, value_name = "NAME", num_args = 1..)]
    servers: Vec<String>,

    /// Exclude the specified servers (ALL for every server)
    #[arg(long, value_name = "NAME", num_args = 1..)]
    exclude: Vec<String>,

    /// Apply filters defined in template
    #[arg(long, value_name = "NAME")]
    template: Option<String>,

    /// Reset target agents to only the selected servers
    #[arg(long)]
    reset: bool,

    /// Allow reset to remove all servers
    #[arg(long)]
    allow_empty: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct AgentsArgs {
    #[command(subcommand)]
    command: AgentsSubcommand,
}

#[derive(Subcommand)]
enum AgentsSubcommand {
    /// Add apply target agents
    Add {
        /// Agent names
        #[arg(required = true, value_parser = PossibleValuesParser::new(AgentKind::IDS))]
        names: Vec<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Remove apply target agents
    Remove {
        /// Agent names
        #[arg(required = true, value_parser = PossibleValuesParser::new(AgentKind::IDS))]
        names: Vec<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List registered apply target agents
    List {
        /// Output agents as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app = AppContext::from_env()?;
    let registry = AgentRegistry::with_default_agents();
    tracing::debug!(home = %app.home_dir().display(), agents = ?registry.ids(), "starting");

    match cli.command {
        Commands::Add {
            name,
            command,
            args,
            env,
            force,
            config,
        } => {
            let options = AddServerOptions::new(name, command)
                .with_args(args)
                .with_env(env)
                .with_force(force);
            let report = ServerCommand::new(app.config_store(config.config.as_deref()))
                .add(&options)?;
            if report.replaced {
                success(&format!("Updated server: \"{}\"", report.name));
            } else if report.changed {
                success(&format!("Added server: \"{}\"", report.name));
            } else {
                println!("Server \"{}\" is already up to date", report.name);
            }
        }
        Commands::Remove { name, config } => {
            let report = ServerCommand::new(app.config_store(config.config.as_deref()))
                .remove(&name)?;
            success(&format!("Removed server: \"{}\"", report.name));
        }
        Commands::Apply(args) => run_apply(&app, &registry, args)?,
        Commands::List { json, config } => {
            let cmd = ServerCommand::new(app.config_store(config.config.as_deref()));
            if json {
                println!("{}", serde_json::to_string_pretty(&cmd.list_json()?)?);
            } else {
                for entry in cmd.list()? {
                    println!("{}: {}", entry.name, entry.summary);
                }
            }
        }
        Commands::Agents(args) => run_agents(&app, &registry, args.command)?,
    }

    Ok(())
}

fn run_apply(app: &AppContext, registry: &AgentRegistry, args: ApplyArgs) -> Result<()> {
    let mut filter = ServerFilterInput::new()
        .with_servers(args.servers)
        .with_exclude(args.exclude)
        .with_reset(args.reset)
        .with_allow_empty(args.allow_empty);
    if let Some(template) = args.template {
        filter = filter.with_template(template);
    }
    let options = ApplyOptions::new()
        .with_agents(args.agents)
        .with_filter(filter);

    let cmd = ApplyCommand::new(
        app.config_store(args.config.config.as_deref()),
        app.agent_context(),
    );
    cmd.run_with(registry, &options, print_agent_result)?;
    Ok(())
}

fn print_agent_result(result: &AgentApplyResult) {
    let path = style(result.path.display()).dim();
    if result.changed {
        println!("{} {} {}", style("✔").green(), result.agent, path);
    } else {
        println!(
            "{} {} {} {}",
            style("✔").green(),
            result.agent,
            path,
            style("(unchanged)").dim()
        );
    }
}

fn run_agents(app: &AppContext, registry: &AgentRegistry, command: AgentsSubcommand) -> Result<()> {
    match command {
        AgentsSubcommand::Add { names, config } => {
            let report = AgentsCommand::new(app.config_store(config.config.as_deref()))
                .add(registry, &names)?;
            if report.changed {
                success(&format!("Added agents: {}", report.affected.join(", ")));
            } else {
                println!("Agents already registered: {}", names.join(", "));
            }
        }
        AgentsSubcommand::Remove { names, config } => {
            let report = AgentsCommand::new(app.config_store(config.config.as_deref()))
                .remove(registry, &names)?;
            success(&format!("Removed agents: {}", report.affected.join(", ")));
        }
        AgentsSubcommand::List { json, config } => {
            let cmd = AgentsCommand::new(app.config_store(config.config.as_deref()));
            if json {
                let output = serde_json::json!({ "agents": cmd.list()? });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for id in cmd.list_sorted()? {
                    println!("{id}");
                }
            }
        }
    }
    Ok(())
}

fn success(message: &str) {
    println!("{} {}", style("✔").green(), message);
}
