//! # Command Center CLI (`cmdc`)
//!
//! Search and browse the squad's notes, agents, daily logs and memory from
//! the terminal, or serve them as a JSON API.
//!
//! ## Usage
//!
//! ```bash
//! cmdc --config ./config/cmdc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cmdc search "<query>"` | Ranked search across every record type |
//! | `cmdc notes` | Kanban board of voice and meeting notes |
//! | `cmdc agents` | Squad overview |
//! | `cmdc agent <id>` | One agent's status documents |
//! | `cmdc tasks` | Mission-control tasks, most urgent first |
//! | `cmdc activity` | Activity feed from the daily logs |
//! | `cmdc interactive` | Search-as-you-type over stdin |
//! | `cmdc sources` | Show the configured data source and its health |
//! | `cmdc serve` | Start the JSON HTTP API |
//! | `cmdc completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Mock data, no config needed
//! cmdc search "dealership dashboard"
//!
//! # Only notes and agents, grouped by type
//! cmdc search ga4 --type note --type agent --grouped
//!
//! # Meeting notes board as JSON
//! cmdc notes --type meeting --json
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use command_center::{activity, agents, config, notes, search, server, sources, tasks};

/// Command Center CLI: search and dashboards over an agent squad's
/// notes, status documents, daily logs and memory.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, the built-in mock data is used.
#[derive(Parser)]
#[command(
    name = "cmdc",
    about = "Command Center: search and dashboards over an agent squad's notes, status and logs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cmdc.toml`. If the file does not exist the mock
    /// data source is used.
    #[arg(long, global = true, default_value = "./config/cmdc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search notes, agents, daily notes and memory.
    Search {
        /// The search query string.
        query: String,

        /// Restrict to result types: `note`, `agent`, `daily-note`, `memory`.
        /// Repeatable or comma-separated.
        #[arg(long = "type")]
        types: Vec<String>,

        /// Maximum number of results (defaults to `[search].max_results`).
        #[arg(long)]
        limit: Option<usize>,

        /// Group results by type.
        #[arg(long)]
        grouped: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the kanban board of notes.
    Notes {
        /// Only `voice` or `meeting` notes.
        #[arg(long = "type")]
        note_type: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the squad overview.
    Agents {
        #[arg(long)]
        json: bool,
    },

    /// Show one agent's focus, blockers, tasks and daily notes.
    Agent {
        /// Agent id (directory name under `agents/`).
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show mission-control tasks, blocked and in-progress work first.
    Tasks {
        /// Only tasks in this status: `inbox`, `assigned`, `in_progress`,
        /// `review`, `done`, `blocked`.
        #[arg(long)]
        status: Option<String>,

        /// Only tasks assigned to this agent id.
        #[arg(long)]
        agent: Option<String>,

        /// Group by status instead of listing by priority.
        #[arg(long)]
        board: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show the activity feed, newest first.
    Activity {
        /// Maximum number of entries.
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Read queries from stdin, one per line, with search-as-you-type debounce.
    Interactive,

    /// Show the configured data source and whether it responds.
    Sources,

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "cmdc", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_or_minimal(&cli.config)?;

    if let Commands::Sources = cli.command {
        return sources::list_sources(&cfg).await;
    }

    let source = sources::make_source(&cfg)?;

    match cli.command {
        Commands::Search {
            query,
            types,
            limit,
            grouped,
            json,
        } => {
            search::run_search(&cfg, source.as_ref(), &query, &types, limit, grouped, json).await?;
        }
        Commands::Notes { note_type, json } => {
            notes::run_notes(source.as_ref(), note_type.as_deref(), json).await?;
        }
        Commands::Agents { json } => {
            agents::run_agents(source.as_ref(), json).await?;
        }
        Commands::Agent { id, json } => {
            agents::run_agent(source.as_ref(), &id, json).await?;
        }
        Commands::Tasks {
            status,
            agent,
            board,
            json,
        } => {
            let filter = tasks::TaskFilter::parse(status.as_deref(), agent.as_deref())?;
            tasks::run_tasks(source.as_ref(), &filter, board, json).await?;
        }
        Commands::Activity { limit, json } => {
            activity::run_activity(source.as_ref(), limit, json).await?;
        }
        Commands::Interactive => {
            search::run_interactive(&cfg, source.as_ref()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg, source).await?;
        }
        Commands::Sources | Commands::Completions { .. } => {
            // Handled above
            unreachable!()
        }
    }

    Ok(())
}
