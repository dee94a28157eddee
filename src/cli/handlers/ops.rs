//! Key command handlers
//!
//! `get`, `set`, `mark-missing`, `del` and `status` map one-to-one onto
//! driver operations. Single keys use the single-key operation and several
//! keys use the batch one.

use std::collections::HashMap;
use std::sync::Arc;

use super::render_value;
use crate::cache::{CacheBody, CacheDriver, CacheValue, ConnectionStatus};
use crate::error::{AppError, AppResult};

/// Handler for the per-key commands
pub struct KeyCommandHandler {
    driver: Arc<dyn CacheDriver>,
}

impl KeyCommandHandler {
    /// Create a new handler over the given driver
    pub fn new(driver: Arc<dyn CacheDriver>) -> Self {
        Self { driver }
    }

    /// Read keys, preserving the order they were given in
    pub async fn get(&self, keys: &[String]) -> AppResult<Vec<(String, CacheValue)>> {
        let values = match keys {
            [key] => {
                let value = self
                    .driver
                    .get(key)
                    .await
                    .map_err(|e| AppError::cache(format!("get {}", key), e))?;
                vec![(key.clone(), value)]
            }
            _ => {
                let found = self
                    .driver
                    .get_multi(keys)
                    .await
                    .map_err(|e| AppError::cache("get_multi", e))?;
                keys.iter()
                    .map(|k| {
                        let value = found.get(k).cloned().unwrap_or(CacheValue::Unknown);
                        (k.clone(), value)
                    })
                    .collect()
            }
        };

        for (key, value) in &values {
            println!("{} = {}", key, render_value(value));
        }
        Ok(values)
    }

    /// Write one payload
    pub async fn set(&self, key: &str, value: &str, ttl: i64) -> AppResult<()> {
        if value.is_empty() {
            return Err(AppError::validation(
                "value",
                "empty values read back as negative markers",
            ));
        }

        self.driver
            .set(key, CacheBody::payload(value), ttl)
            .await
            .map_err(|e| AppError::cache(format!("set {}", key), e))?;
        println!("OK");
        Ok(())
    }

    /// Store negative markers for the given keys
    pub async fn mark_missing(&self, keys: &[String], ttl: i64) -> AppResult<()> {
        match keys {
            [key] => {
                self.driver
                    .set(key, CacheBody::NegativeMarker, ttl)
                    .await
                    .map_err(|e| AppError::cache(format!("mark {}", key), e))?;
            }
            _ => {
                let values: HashMap<String, CacheBody> = keys
                    .iter()
                    .map(|k| (k.clone(), CacheBody::NegativeMarker))
                    .collect();
                self.driver
                    .set_multi(values, ttl)
                    .await
                    .map_err(|e| AppError::cache("set_multi", e))?;
            }
        }
        println!("Marked {} key(s) as never existing", keys.len());
        Ok(())
    }

    /// Remove keys. The count of existing keys is only known for batches.
    pub async fn del(&self, keys: &[String]) -> AppResult<Option<u64>> {
        if let [key] = keys {
            self.driver
                .remove(key)
                .await
                .map_err(|e| AppError::cache(format!("remove {}", key), e))?;
            println!("OK");
            return Ok(None);
        }

        let removed = self
            .driver
            .remove_multi(keys)
            .await
            .map_err(|e| AppError::cache("remove_multi", e))?;
        println!("Removed {} of {} key(s)", removed, keys.len());
        Ok(Some(removed))
    }

    /// Print the connection status
    pub fn status(&self, status: ConnectionStatus) -> bool {
        let usable = self.driver.usable();
        println!("Connection: {}", status);
        println!("Usable: {}", if usable { "yes" } else { "no" });
        usable
    }
}
