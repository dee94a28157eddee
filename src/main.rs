use clap::Parser;

use rache_redis::cache::CacheManager;
use rache_redis::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match cli::load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", anyhow::Error::from(e));
            std::process::exit(1);
        }
    };

    let _log_handle = cli::init_logger_from_settings(&settings, &cli)?;
    tracing::debug!(version = rache_redis::pkg_version(), "starting rache-redis");

    let manager = CacheManager::connect(settings.cache).await?;
    let result = cli::execute_command(&cli, &manager).await;
    manager.close();

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {:#}", anyhow::Error::from(e));
        std::process::exit(1);
    }

    Ok(())
}
