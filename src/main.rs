//! Meal Finder CLI application
//!
//! Command-line interface for searching TheMealDB recipes and managing a
//! local list of favorite meals.

use std::process;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use meal_finder::cli::{handle_command, Cli, Session};
use meal_finder::config::AppConfig;
use meal_finder::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.global.config.is_none() {
        if let Err(e) = AppConfig::initialize_first_run().await {
            // Not fatal: defaults still apply
            eprintln!("Warning: {}", e);
        }
    }
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config);
    info!("Meal Finder v{} starting", env!("CARGO_PKG_VERSION"));

    let session = Session::open(&config, &cli.global).await?;
    handle_command(&session, cli.command).await
}

/// Initialize logging from CLI verbosity flags and the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let level = cli.log_level(&config.logging.level);

    let mut filter = EnvFilter::from_default_env();
    let invalid_level = match format!("meal_finder={}", level).parse() {
        Ok(directive) => {
            filter = filter.add_directive(directive);
            false
        }
        Err(_) => true,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if invalid_level {
        warn!("Ignoring invalid log level \"{}\"", level);
    }
}
