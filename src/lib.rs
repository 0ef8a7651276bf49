//! dbackup library
//!
//! Backs up PostgreSQL and MariaDB servers by driving their native dump and
//! basebackup tools, one target at a time.

pub mod config;
pub mod executors;
pub mod logging;
pub mod orchestrator;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, Config, Engine, TargetConfig};
pub use executors::BackupExecutor;
pub use utils::credentials::CredentialsFile;
