//! rache-redis library
//!
//! Tri-state cache driver over Redis, with the configuration, logging and
//! CLI layers around it.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
