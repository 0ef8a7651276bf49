//! Backup executors, one per database engine
//!
//! An executor owns the connection settings of a single target and knows how
//! to enumerate its databases and dump each of them with the engine's client
//! tools. The orchestration steps shared by every engine live in the
//! provided [`BackupExecutor::backup`] implementation.

pub mod mariadb;
pub mod postgres;

pub use mariadb::MariadbExecutor;
pub use postgres::PostgresExecutor;

use crate::config::{Config, Engine};
use crate::utils::credentials::CredentialsFile;
use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid target name '{0}': names may only contain letters, digits, '_' and '-'")]
    InvalidTargetName(String),

    #[error("socket {path} for target '{target}' does not exist")]
    SocketNotFound { target: String, path: PathBuf },

    #[error("failed to write credentials for target '{0}'")]
    Credentials(String, #[source] std::io::Error),
}

/// Capability set of one backup target.
pub trait BackupExecutor: std::fmt::Debug {
    /// Target name, also used as the output subdirectory.
    fn name(&self) -> &str;

    /// Client binaries this executor invokes, for the preflight check.
    fn client_binaries(&self) -> &'static [&'static str];

    /// Enumerate the databases to back up, in the engine's output order.
    fn databases(&self) -> Result<Vec<String>>;

    /// Dump a single database into `target_dir`.
    fn backup_database(&self, database: &str, target_dir: &Path) -> Result<()>;

    /// Instance-level backup. Engines without one keep this no-op default.
    fn full_backup(&self, target_dir: &Path) -> Result<()> {
        debug!("No full backup mechanism for {}", self.name());
        let _ = target_dir;
        Ok(())
    }

    /// Back up the whole target under `output_dir`.
    ///
    /// Errors propagate immediately: a failing database aborts the target's
    /// remaining databases. Isolation across targets is the orchestrator's
    /// job.
    fn backup(&self, output_dir: &Path) -> Result<()> {
        let target_dir = output_dir.join(self.name());
        if !target_dir.exists() {
            fs::DirBuilder::new()
                .mode(0o700)
                .create(&target_dir)
                .with_context(|| format!("Failed to create {}", target_dir.display()))?;
        }

        self.full_backup(&target_dir)?;

        for database in self.databases()? {
            info!("Creating backup for database {} in {}", database, self.name());
            self.backup_database(&database, &target_dir)?;
        }

        Ok(())
    }
}

/// Turn the parsed configuration into a validated executor list.
///
/// Fails on the first invalid entry; callers never run a partial list. Any
/// credentials written for earlier entries are torn down with the
/// [`CredentialsFile`] guard when the caller aborts.
pub fn load(
    config: &Config,
    credentials: &CredentialsFile,
) -> std::result::Result<Vec<Box<dyn BackupExecutor>>, LoadError> {
    let mut executors: Vec<Box<dyn BackupExecutor>> = Vec::new();

    for (name, target) in config {
        validate_target_name(name)?;

        let executor: Box<dyn BackupExecutor> = match target.engine {
            Engine::Postgresql => {
                Box::new(PostgresExecutor::new(name.clone(), target, credentials)?)
            }
            Engine::Mariadb => Box::new(MariadbExecutor::new(name.clone(), target)?),
        };
        executors.push(executor);
    }

    Ok(executors)
}

/// Target names become path segments, so anything outside `[A-Za-z0-9_-]+`
/// is rejected.
fn validate_target_name(name: &str) -> std::result::Result<(), LoadError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidTargetName(name.to_string()))
    }
}
