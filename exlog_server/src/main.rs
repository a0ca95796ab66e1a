use clap::{Parser, Subcommand};
use exlog_core::log_filter::LogFilter;
use exlog_core::{Config, Error, ExerciseService, JsonlStore, Result, StoreBackend};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "exlog")]
#[command(about = "Exercise tracker HTTP service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to $XDG_CONFIG_HOME/exlog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Listen host
        #[arg(long)]
        host: Option<String>,

        /// Listen port
        #[arg(long)]
        port: Option<u16>,

        /// Keep all data in memory
        #[arg(long)]
        memory: bool,
    },

    /// Fold the journal into the snapshot
    Compact,

    /// Export a user's log as CSV
    Export {
        /// User id
        #[arg(long)]
        user: String,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    exlog_core::logging::init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.store.data_dir = data_dir;
    }

    match cli.command {
        Some(Commands::Serve { host, port, memory }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if memory {
                config.store.backend = StoreBackend::Memory;
            }
            cmd_serve(config).await
        }
        Some(Commands::Compact) => cmd_compact(&config),
        Some(Commands::Export {
            user,
            out,
            from,
            to,
            limit,
        }) => {
            let filter = LogFilter::from_query(from.as_deref(), to.as_deref(), limit.as_deref());
            cmd_export(&config, &user, out, &filter).await
        }
        None => cmd_serve(config).await,
    }
}

async fn cmd_serve(config: Config) -> Result<()> {
    config.validate()?;
    exlog_server::run_server(config).await
}

fn cmd_compact(config: &Config) -> Result<()> {
    if config.store.backend == StoreBackend::Memory {
        println!("In-memory store - nothing to compact.");
        return Ok(());
    }

    let store = JsonlStore::open(&config.store.data_dir)?;
    let count = store.compact()?;

    println!("✓ Compacted {} users into snapshot", count);
    println!("  Data: {}", store.dir().display());
    Ok(())
}

async fn cmd_export(
    config: &Config,
    user_id: &str,
    out: Option<PathBuf>,
    filter: &LogFilter,
) -> Result<()> {
    if config.store.backend == StoreBackend::Memory {
        return Err(Error::Config("cannot export from an in-memory store".into()));
    }

    let store = JsonlStore::open(&config.store.data_dir)?;
    let service = ExerciseService::new(Arc::new(store));
    let user = service.get_user_with_exercises(user_id).await?;

    let count = match out {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            let count = exlog_core::export::write_user_csv(&user, filter, file)?;
            println!("✓ Exported {} exercises to {}", count, path.display());
            count
        }
        None => exlog_core::export::write_user_csv(&user, filter, std::io::stdout().lock())?,
    };

    tracing::debug!("Export finished with {} rows", count);
    Ok(())
}
