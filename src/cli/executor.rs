//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing, configuration loading and cache connection.

use super::handlers::{DemoCommandHandler, KeyCommandHandler};
use super::parser::{Cli, Commands};
use crate::cache::CacheManager;
use crate::error::{AppError, AppResult};

/// Execute a CLI command against a connected cache
///
/// `status` without a usable store is reported as an error so the exit code
/// reflects it.
pub async fn execute_command(cli: &Cli, manager: &CacheManager) -> AppResult<()> {
    if let Err(msg) = cli.validate() {
        return Err(AppError::validation("cli_arguments", msg));
    }

    let driver = manager.driver();
    tracing::debug!(backend = ?manager.config().backend, command = ?cli.command_or_default(), "executing command");

    match cli.command_or_default() {
        Commands::Demo { ttl } => {
            DemoCommandHandler::new(driver, ttl).execute().await?;
        }
        Commands::Get { keys } => {
            KeyCommandHandler::new(driver).get(&keys).await?;
        }
        Commands::Set { key, value, ttl } => {
            KeyCommandHandler::new(driver).set(&key, &value, ttl).await?;
        }
        Commands::MarkMissing { keys, ttl } => {
            KeyCommandHandler::new(driver).mark_missing(&keys, ttl).await?;
        }
        Commands::Del { keys } => {
            KeyCommandHandler::new(driver).del(&keys).await?;
        }
        Commands::Status => {
            println!("Backend: {:?}", manager.config().backend);
            if !KeyCommandHandler::new(driver).status(manager.status()) {
                return Err(AppError::validation("cache", "store is not usable"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheBackend, CacheConfig};
    use clap::Parser;

    async fn memory_manager() -> CacheManager {
        CacheManager::connect(CacheConfig {
            backend: CacheBackend::Memory,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_execute_status_on_memory() {
        let cli = Cli::try_parse_from(["rache-redis", "status"]).unwrap();
        let manager = memory_manager().await;
        assert!(execute_command(&cli, &manager).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_status_after_close_fails() {
        let cli = Cli::try_parse_from(["rache-redis"]).unwrap();
        let manager = memory_manager().await;
        manager.close();
        assert!(execute_command(&cli, &manager).await.is_err());
    }

    #[tokio::test]
    async fn test_execute_set_get_del() {
        let manager = memory_manager().await;

        for args in [
            vec!["rache-redis", "set", "k", "v", "--ttl", "30"],
            vec!["rache-redis", "get", "k", "other"],
            vec!["rache-redis", "del", "k"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            execute_command(&cli, &manager).await.unwrap();
        }

        let value = manager.driver().get("k").await.unwrap();
        assert!(value.is_unknown());
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_combination() {
        let cli = Cli::try_parse_from([
            "rache-redis",
            "--backend",
            "memory",
            "--url",
            "redis://localhost",
            "status",
        ])
        .unwrap();
        let manager = memory_manager().await;

        let result = execute_command(&cli, &manager).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
