mod commands;

use callnotes_chroma::{ChromaClient, ServerLauncher, INSTALL_HINTS};
use callnotes_common::{logger, AppConfig, CallNotesError};
use callnotes_summaries::{ChromaSummaries, SearchQuery};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
            return;
        }
    }

    dotenv::dotenv().ok();
}

#[derive(Parser)]
#[command(name = "callnotes")]
#[command(about = "Inspect and search call transcript summaries stored in ChromaDB", long_about = None)]
struct Cli {
    /// Chroma host (overrides CHROMA_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Chroma port (overrides CHROMA_PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Summary collection (overrides SUMMARY_COLLECTION)
    #[arg(long, global = true)]
    collection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a local ChromaDB server in the foreground
    Serve {
        /// Database directory (overrides CHROMA_DB_PATH)
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Python interpreter with chromadb installed (overrides CHROMA_PYTHON)
        #[arg(long)]
        python: Option<String>,
    },

    /// List stored summaries with their metadata
    Inspect {
        /// Maximum number of summaries
        #[arg(long)]
        limit: Option<u32>,

        /// Summaries to skip
        #[arg(long)]
        offset: Option<u32>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Case-insensitive text search over summaries (not semantic)
    Search {
        /// Search text; multiple words are joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Check the server and count stored summaries
    Status,
}

impl Cli {
    /// Apply command-line overrides on top of the environment configuration
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.chroma_host = host.clone();
        }
        if let Some(port) = self.port {
            config.chroma_port = port;
        }
        if let Some(collection) = &self.collection {
            config.collection = collection.clone();
        }
        if let Commands::Serve { db_path, python } = &self.command {
            if let Some(db) = db_path {
                config.chroma_db_path = db.clone();
            }
            if let Some(python) = python {
                config.python_bin = python.clone();
            }
        }
    }
}

/// Environment configuration with command-line overrides, validated
fn load_config(cli: &Cli, base: Result<AppConfig, CallNotesError>) -> Result<AppConfig, CallNotesError> {
    let mut config = base?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Text printed to stderr when a command fails
fn exit_message(command: &Commands, err: &CallNotesError) -> String {
    match (command, err) {
        (Commands::Serve { .. }, CallNotesError::Process(_)) => {
            format!("Error starting server: {}\n\n{}", err, INSTALL_HINTS)
        }
        (Commands::Inspect { .. }, _) => commands::failure_message(err, true),
        _ => commands::failure_message(err, false),
    }
}

async fn run(cli: &Cli) -> Result<(), CallNotesError> {
    let config = load_config(cli, AppConfig::from_env())?;

    match &config.log_dir {
        Some(dir) => logger::setup_logging(dir, &config.log_level)?,
        None => logger::setup_console_logging(&config.log_level)?,
    }

    tracing::debug!("Configuration loaded: {:?}", config);

    match &cli.command {
        Commands::Serve { .. } => ServerLauncher::from_config(&config).run().await,
        Commands::Inspect { limit, offset, json } => {
            let client = ChromaClient::from_config(&config)?;
            let source = ChromaSummaries::new(client, &config.collection).with_page(*limit, *offset);
            let mut out = std::io::stdout().lock();
            commands::inspect(&source, &mut out, *json).await.map(|_| ())
        }
        Commands::Search { query } => {
            let query = SearchQuery::from_words(query.as_slice())?;
            let client = ChromaClient::from_config(&config)?;
            let source = ChromaSummaries::new(client, &config.collection);
            let mut out = std::io::stdout().lock();
            commands::search(&source, &query, &mut out).await.map(|_| ())
        }
        Commands::Status => {
            let client = ChromaClient::from_config(&config)?;
            let summaries = ChromaSummaries::new(client, &config.collection);
            let mut out = std::io::stdout().lock();
            commands::status(&summaries, &mut out).await.map(|_| ())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    if let Err(e) = run(&cli).await {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("{}", exit_message(&cli.command, &e));
        std::process::exit(1);
    }
}
