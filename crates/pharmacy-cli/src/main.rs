mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED_COUNT: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "pharmacy-cli")]
#[command(about = "Pharmacy directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Print pharmacies as JSON, optionally filtered by name
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Print pharmacies within a radius of a point, closest first
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        /// Search radius in kilometres
        #[arg(long, default_value_t = 5.0)]
        radius: f64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Top the table up with demo pharmacies
    Seed {
        #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pharmacy-cli: no command given, try --help");
        return Ok(());
    };

    let config = pharmacy_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Db { command } => {
            let pool = commands::connect(&config).await?;
            match command {
                DbCommands::Ping => commands::run_db_ping(&pool).await,
                DbCommands::Migrate => commands::run_db_migrate(&pool).await,
                DbCommands::Seed { count } => commands::run_db_seed(&pool, count).await,
            }
        }
        Commands::List {
            search,
            limit,
            offset,
        } => {
            let pool = commands::connect(&config).await?;
            commands::run_list(pool, search, limit, offset).await
        }
        Commands::Nearest {
            latitude,
            longitude,
            radius,
            limit,
        } => commands::run_nearest(&config, latitude, longitude, radius, limit).await,
    }
}
