use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use suds::board::{PaymentFilter, PriorityFilter};
use suds::config::{CliOverrides, SudsConfig};
use suds_common::{ColumnId, Priority};

mod cmd;

#[derive(Parser)]
#[command(name = "suds")]
#[command(version, about = "Laundry order board: track orders through the wash pipeline")]
pub struct Cli {
    /// Debug logging for suds (SUDS_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory searched for .suds/suds.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Backend root URL, e.g. http://localhost:5000. Overrides SUDS_API_URL and suds.toml
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token. Overrides SUDS_TOKEN and suds.toml
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the board, optionally filtered
    Board {
        /// Case-insensitive match on title, customer name or description
        #[arg(short, long)]
        search: Option<String>,

        /// all, low, medium or high
        #[arg(long, default_value = "all")]
        priority: PriorityFilter,

        /// all, paid or unpaid
        #[arg(long, default_value = "all")]
        payment: PaymentFilter,
    },
    /// Move a task to another column (todo, in-progress, done, delivery)
    Move { task_id: String, column: String },
    /// Create a task
    Add(TaskArgs),
    /// Edit fields of an existing task
    Edit {
        task_id: String,

        #[command(flatten)]
        fields: EditArgs,
    },
    /// Delete a task
    Delete { task_id: String },
    /// Follow live updates from other operators until Ctrl-C
    Watch {
        /// Reprint the whole board after every update
        #[arg(long)]
        board: bool,
    },
    /// Show revenue, paid and pending totals
    Summary,
    /// List customers
    Customers,
    /// Show a customer's loyalty points and available rewards
    Loyalty {
        customer_id: String,

        /// Redeem the reward with this id
        #[arg(long)]
        redeem: Option<String>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args, Clone, Debug)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: String,

    /// Customer id
    #[arg(long)]
    pub customer: String,

    /// Due date: RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long)]
    pub due: String,

    #[arg(long, default_value = "todo")]
    pub column: ColumnId,

    #[arg(long, default_value = "medium")]
    pub priority: Priority,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub items: Option<u32>,

    /// Weight in kg
    #[arg(long)]
    pub weight: Option<f64>,

    /// Number of blankets (enables the blanket add-on)
    #[arg(long)]
    pub blankets: Option<u32>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub service: Option<String>,

    #[arg(long)]
    pub paid: bool,

    /// Staff member id
    #[arg(long)]
    pub assign: Option<String>,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct EditArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub column: Option<ColumnId>,

    #[arg(long)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub items: Option<u32>,

    #[arg(long)]
    pub weight: Option<f64>,

    /// Number of blankets; 0 removes the add-on
    #[arg(long)]
    pub blankets: Option<u32>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub service: Option<String>,

    #[arg(long, conflicts_with = "unpaid")]
    pub paid: bool,

    #[arg(long)]
    pub unpaid: bool,

    #[arg(long)]
    pub assign: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default .suds/suds.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    suds::logging::init(cli.verbose, cli.log_json);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        token: cli.token.clone(),
    };

    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(&project_dir, overrides, command.clone());
    }

    let config = SudsConfig::resolve(&project_dir, overrides).context("Failed to load configuration")?;

    match &cli.command {
        Commands::Board {
            search,
            priority,
            payment,
        } => cmd::cmd_board(&config, search.clone(), *priority, *payment).await?,
        Commands::Move { task_id, column } => cmd::cmd_move(&config, task_id, column).await?,
        Commands::Add(args) => cmd::cmd_add(&config, args).await?,
        Commands::Edit { task_id, fields } => cmd::cmd_edit(&config, task_id, fields).await?,
        Commands::Delete { task_id } => cmd::cmd_delete(&config, task_id).await?,
        Commands::Watch { board } => cmd::cmd_watch(&config, *board).await?,
        Commands::Summary => cmd::cmd_summary(&config).await?,
        Commands::Customers => cmd::cmd_customers(&config).await?,
        Commands::Loyalty {
            customer_id,
            redeem,
        } => cmd::cmd_loyalty(&config, customer_id, redeem.as_deref()).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
