mod backend;
mod leads;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadsai_core::{CrmStatus, MessageSource};
use leadsai_db::{open_store, BackendSelection};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadsai")]
#[command(about = "LeadsAI lead intelligence command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a simulated inbound message and store it as a lead
    Simulate {
        /// Message text as the customer wrote it
        message: String,
        /// Source channel (label or slug, e.g. "linkedin-message")
        #[arg(long, short, default_value = "instagram-dm", value_parser = parse_platform)]
        platform: MessageSource,
    },
    /// List leads, newest first
    List {
        /// Only leads in this CRM status
        #[arg(long, value_parser = parse_status)]
        status: Option<CrmStatus>,
        /// Maximum number of leads to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one lead with its analysis and activity trail
    Show { id: String },
    /// Move a lead to a new CRM status
    Status {
        id: String,
        #[arg(value_parser = parse_status)]
        status: CrmStatus,
    },
    /// Append a note to a lead's activity trail
    Note {
        id: String,
        content: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Export all leads as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Dashboard counters: totals, hot-lead rate, intent breakdown
    Stats,
    /// Pipeline board grouped by CRM status
    Board,
    /// Delete every lead and every history entry
    Clear {
        /// Required; the deletion cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Show which persistence backend is configured
    Backend,
    /// Remote database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the remote store answers
    Ping,
    /// Apply pending migrations to the remote store
    Migrate,
}

fn parse_platform(raw: &str) -> Result<MessageSource, String> {
    raw.parse().map_err(|e: leadsai_core::CoreError| e.to_string())
}

fn parse_status(raw: &str) -> Result<CrmStatus, String> {
    raw.parse().map_err(|e: leadsai_core::CoreError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = leadsai_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("leadsai ready; run `leadsai --help` for commands");
        return Ok(());
    };

    let selection = BackendSelection::from_app_config(&config);
    tracing::debug!(backend = %selection.mode(), "backend selected");

    match command {
        Commands::Backend => {
            print!("{}", backend::run_backend(&config));
            return Ok(());
        }
        Commands::Db { command } => {
            match command {
                DbCommands::Ping => backend::run_db_ping(&selection).await?,
                DbCommands::Migrate => backend::run_db_migrate(&selection).await?,
            }
            return Ok(());
        }
        _ => {}
    }

    let store = open_store(&selection).await?;
    let output = match command {
        Commands::Simulate { message, platform } => {
            let classifier = leadsai_intel::classifier_from_config(&config)?;
            leads::run_simulate(store.as_ref(), classifier.as_ref(), &message, platform).await?
        }
        Commands::List { status, limit } => leads::run_list(store.as_ref(), status, limit).await?,
        Commands::Show { id } => leads::run_show(store.as_ref(), &id).await?,
        Commands::Status { id, status } => {
            leads::run_status(store.as_ref(), &id, status).await?
        }
        Commands::Note {
            id,
            content,
            author,
        } => leads::run_note(store.as_ref(), &id, &content, author.as_deref()).await?,
        Commands::Export { output } => leads::run_export(store.as_ref(), output.as_deref()).await?,
        Commands::Stats => leads::run_stats(store.as_ref()).await?,
        Commands::Board => leads::run_board(store.as_ref()).await?,
        Commands::Clear { yes } => leads::run_clear(store.as_ref(), yes).await?,
        Commands::Backend | Commands::Db { .. } => String::new(),
    };

    print!("{output}");
    Ok(())
}
