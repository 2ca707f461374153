mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{cmd_add, cmd_clear, cmd_delete, cmd_summary, cmd_view};
use crate::config::Config;
use nosh_core::service::NoshService;

#[derive(Parser)]
#[command(
    name = "nosh",
    version,
    about = "A simple daily calorie logger",
    long_about = "\n\n  ███╗   ██╗ ██████╗ ███████╗██╗  ██╗
  ████╗  ██║██╔═══██╗██╔════╝██║  ██║
  ██╔██╗ ██║██║   ██║███████╗███████║
  ██║╚██╗██║██║   ██║╚════██║██╔══██║
  ██║ ╚████║╚██████╔╝███████║██║  ██║
  ╚═╝  ╚═══╝ ╚═════╝ ╚══════╝╚═╝  ╚═╝
        track your meals, day by day.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log an ingredient with its calorie count
    Add {
        /// Ingredient name
        name: String,
        /// Calories (positive integer)
        calories: i64,
        /// Date to log for (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by ID
    Delete {
        /// Entry ID to delete
        entry_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every entry
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entries and total for one day (defaults to today)
    View {
        /// Date to show (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the rolling 7-day summary
    Summary {
        /// Most recent date of the window (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the web UI
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5001")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = NoshService::new(&config.db_path)?;

    match cli.command {
        Commands::Add {
            name,
            calories,
            date,
            json,
        } => cmd_add(&svc, &name, calories, date, json),
        Commands::Delete { entry_id, json } => cmd_delete(&svc, entry_id, json),
        Commands::Clear { json } => cmd_clear(&svc, json),
        Commands::View { date, json } => cmd_view(&svc, date, json),
        Commands::Summary { date, json } => cmd_summary(&svc, date, json),
        Commands::Serve { port, bind } => server::start_server(svc, port, &bind).await,
    }
}
