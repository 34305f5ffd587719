use chrono::Utc;
use clap::{Parser, Subcommand};
use extrack_core::service;
use extrack_core::*;
use extrack_server::ExtrackServer;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extrack")]
#[command(about = "Exercise tracker API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to $XDG_CONFIG_HOME/extrack/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store connection string: memory:, file:<path> or a bare path
    #[arg(long, global = true)]
    store: Option<String>,

    /// Port to listen on
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print all users as JSON
    Users,

    /// Print a user's exercise log as JSON
    Log {
        /// User id
        id: String,

        /// Earliest date to include (inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Latest date to include (inclusive, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of entries
        #[arg(long)]
        limit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config file, then environment, then flags
    let config_path = cli.config.clone().or_else(Config::default_config_path);
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env_overrides()?;
    if let Some(url) = cli.store {
        config.store.url = url;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    extrack_core::logging::init(&config.logging);
    tracing::debug!(
        config_path = ?config_path,
        store = %config.store.url,
        log_format = %config.logging.format,
        "Configuration resolved"
    );

    let store = open_store(&config.store.url)?;

    match cli.command {
        Some(Commands::Serve) | None => {
            ExtrackServer::new(store, config.server).run().await
        }
        Some(Commands::Users) => cmd_users(store.as_ref()),
        Some(Commands::Log {
            id,
            from,
            to,
            limit,
        }) => {
            let query = LogQuery { from, to, limit };
            cmd_log(store.as_ref(), &UserId::from(id.as_str()), &query)
        }
    }
}

fn cmd_users(store: &dyn ExerciseStore) -> Result<()> {
    let users = service::list_users(store)?;
    println!("{}", serde_json::to_string_pretty(&users)?);
    store.close()
}

fn cmd_log(store: &dyn ExerciseStore, id: &UserId, query: &LogQuery) -> Result<()> {
    let log = service::user_log(store, id, query, Utc::now().date_naive())?;
    println!("{}", serde_json::to_string_pretty(&log)?);
    store.close()
}
