//! Configuration module for dbackup
//!
//! The configuration file is a YAML mapping from target name to connection
//! settings:
//!
//! ```yaml
//! db1:
//!   type: postgresql
//!   socket: /var/run/postgresql
//!   user: backup
//!   password: secret
//! ```
//!
//! Target names double as output directory names, so they are restricted to
//! `[A-Za-z0-9_-]+`; that check happens when executors are constructed from
//! the parsed mapping.

mod loader;
mod types;

pub use loader::{load_config, ConfigError, Result};
pub use types::*;
