//! Sequential backup orchestration
//!
//! Owns the credentials-file lifetime: the file is created before any
//! executor is constructed and removed when this module returns, on success
//! and on every failure path alike. Targets run strictly one after another;
//! a failing target is logged and the loop moves on.

use crate::config::Config;
use crate::executors::{self, BackupExecutor};
use crate::utils::credentials::CredentialsFile;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{error, info, warn};

/// Run one full backup pass over every configured target.
///
/// A credentials-file or configuration failure aborts before any backup and
/// is returned to the caller; individual target failures are logged and do
/// not surface in the result.
pub fn run(config: &Config, output_dir: &Path, credentials_path: &Path) -> Result<()> {
    let credentials = CredentialsFile::acquire(credentials_path)
        .context("Unable to create credentials file")?;

    let executors =
        executors::load(config, &credentials).context("Error during configuration loading")?;

    check_client_binaries(&executors);
    run_backups(&executors, output_dir);
    Ok(())
}

/// Back up each target in turn, isolating failures per target.
pub fn run_backups(executors: &[Box<dyn BackupExecutor>], output_dir: &Path) {
    for executor in executors {
        info!("Processing {}", executor.name());
        if let Err(e) = executor.backup(output_dir) {
            error!(
                "Error while processing backups for {}: {:#}",
                executor.name(),
                e
            );
        }
    }
}

/// Warn about client binaries the configured targets need but PATH lacks.
/// The affected targets will fail and be skipped; the run itself proceeds.
fn check_client_binaries(executors: &[Box<dyn BackupExecutor>]) {
    let mut missing = BTreeSet::new();
    for executor in executors {
        for binary in executor.client_binaries() {
            if which::which(binary).is_err() {
                missing.insert(*binary);
            }
        }
    }
    for binary in missing {
        warn!("Client binary '{}' not found in PATH", binary);
    }
}
