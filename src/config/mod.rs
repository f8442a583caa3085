//! Finder Configuration Module
//!
//! Server address, upstream OpenFEMA client settings and search defaults,
//! loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `FINDER_CONFIG` environment variable (path to TOML file)
//! 2. `finder_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `FINDER_SERVER_ADDR` overrides the bind address after loading.
//!
//! ## Usage
//!
//! ```ignore
//! let config = Arc::new(FinderConfig::load());
//! let client = OpenFemaClient::new(&config.api)?;
//! ```

mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::*;
