//! Demo command handler
//!
//! Walks through the sample flow of a user cache: the record is stored under
//! several lookup keys, lookups that found nothing in the source of truth are
//! remembered as negative markers, and per-user attachments come and go.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::render_value;
use crate::cache::{CacheBody, CacheDriver, CacheValue};
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct User {
    id: u64,
    name: &'static str,
    email: &'static str,
    system: u32,
}

const DEMO_USER: User = User {
    id: 1,
    name: "hello",
    email: "user@sample.com",
    system: 33,
};

fn primary_key(id: u64) -> String {
    format!("users:primary:{}", id)
}

fn email_key(email: &str, system: u32) -> String {
    format!("users:email:{}:{}", email, system)
}

fn name_key(name: &str, system: u32) -> String {
    format!("users:name:{}:{}", name, system)
}

fn attachment_key(id: u64, attachment: &str) -> String {
    format!("{}:{}", primary_key(id), attachment)
}

/// Handler for the demo command
pub struct DemoCommandHandler {
    driver: Arc<dyn CacheDriver>,
    ttl: i64,
    reads: Vec<(String, CacheValue)>,
}

impl DemoCommandHandler {
    /// Create a new demo handler. `ttl` applies to negative markers and
    /// attachments; user records are stored without expiry.
    pub fn new(driver: Arc<dyn CacheDriver>, ttl: i64) -> Self {
        Self {
            driver,
            ttl,
            reads: Vec::new(),
        }
    }

    /// Run the flow and return every read in the order it happened
    pub async fn execute(mut self) -> AppResult<Vec<(String, CacheValue)>> {
        if !self.driver.usable() {
            return Err(AppError::validation("cache", "store is not usable"));
        }

        let user = serde_json::to_vec(&DEMO_USER).map_err(anyhow::Error::from)?;

        // Store the record under every lookup key in one bulk write.
        let entries: HashMap<String, CacheBody> = [
            primary_key(DEMO_USER.id),
            email_key(DEMO_USER.email, DEMO_USER.system),
            name_key(DEMO_USER.name, DEMO_USER.system),
        ]
        .into_iter()
        .map(|k| (k, CacheBody::payload(user.clone())))
        .collect();
        self.driver.set_multi(entries, 0).await?;

        self.read(&primary_key(DEMO_USER.id)).await?;
        self.read(&email_key(DEMO_USER.email, DEMO_USER.system)).await?;

        // Lookups the source of truth answered with "no such user".
        self.driver
            .set(&primary_key(2), CacheBody::NegativeMarker, self.ttl)
            .await?;
        self.driver
            .set(&email_key("hacker@sample.com", 31), CacheBody::NegativeMarker, self.ttl)
            .await?;
        let missing: HashMap<String, CacheBody> = [444, 555]
            .into_iter()
            .map(|id| (primary_key(id), CacheBody::NegativeMarker))
            .collect();
        self.driver.set_multi(missing, self.ttl).await?;

        self.read(&email_key("hacker@sample.com", 31)).await?;
        self.read(&primary_key(2)).await?;
        self.read(&primary_key(555)).await?;
        self.read(&primary_key(333)).await?;

        let roles = attachment_key(DEMO_USER.id, "roles");
        let wallet = attachment_key(DEMO_USER.id, "wallet");

        self.read(&roles).await?;
        self.driver
            .set(&wallet, CacheBody::payload("0"), self.ttl)
            .await?;
        self.read(&wallet).await?;
        self.driver
            .set(&roles, CacheBody::payload("[1,2,3]"), self.ttl)
            .await?;
        self.read(&roles).await?;
        self.driver.remove(&roles).await?;
        self.read(&roles).await?;

        let demo_keys = vec![
            primary_key(DEMO_USER.id),
            email_key(DEMO_USER.email, DEMO_USER.system),
            name_key(DEMO_USER.name, DEMO_USER.system),
            primary_key(2),
            email_key("hacker@sample.com", 31),
            primary_key(444),
            primary_key(555),
            roles,
            wallet,
        ];
        let removed = self.driver.remove_multi(&demo_keys).await?;
        info!(removed, total = demo_keys.len(), "demo keys cleaned up");

        Ok(self.reads)
    }

    async fn read(&mut self, key: &str) -> AppResult<()> {
        let value = self
            .driver
            .get(key)
            .await
            .map_err(|e| AppError::cache(format!("get {}", key), e))?;
        println!("{:<40} {}", key, render_value(&value));
        self.reads.push((key.to_string(), value));
        Ok(())
    }
}
