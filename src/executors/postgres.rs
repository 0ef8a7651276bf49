//! PostgreSQL backup executor
//!
//! Authentication goes through the shared pgpass-style credentials file:
//! construction appends this target's entry and every spawned client tool
//! gets `PGPASSFILE` pointing at it.

use super::{BackupExecutor, LoadError};
use crate::config::TargetConfig;
use crate::utils::command;
use crate::utils::credentials::CredentialsFile;
use anyhow::{Context, Result};
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DB_LIST_QUERY: &str = "SELECT datname FROM pg_database \
     WHERE datname NOT LIKE 'template%' \
     AND has_database_privilege(CURRENT_ROLE, datname, 'connect');";

const REPLICATION_CHECK_QUERY: &str =
    "SELECT 1 FROM pg_roles WHERE rolname = CURRENT_USER AND (rolsuper OR rolreplication);";

#[derive(Debug)]
pub struct PostgresExecutor {
    name: String,
    socket: PathBuf,
    user: String,
    passfile: PathBuf,
}

impl PostgresExecutor {
    pub fn new(
        name: String,
        target: &TargetConfig,
        credentials: &CredentialsFile,
    ) -> std::result::Result<Self, LoadError> {
        if !target.socket.exists() {
            return Err(LoadError::SocketNotFound {
                target: name,
                path: target.socket.clone(),
            });
        }

        credentials
            .append_entry(&target.socket, &target.user, &target.password)
            .map_err(|e| LoadError::Credentials(name.clone(), e))?;

        Ok(Self {
            name,
            socket: target.socket.clone(),
            user: target.user.clone(),
            passfile: credentials.path().to_path_buf(),
        })
    }

    fn psql(&self, query: &str) -> Result<String> {
        let socket = self.socket.display().to_string();
        command::run_command_stdout(
            "psql",
            &[
                "--csv", "-t", "-U", &self.user, "-d", "postgres", "-h", &socket, "-c", query,
            ],
            &[("PGPASSFILE", self.passfile.as_path())],
        )
    }

    /// Whether the configured role may run a base backup.
    ///
    /// Fail closed: any failure of the check itself, from a missing client
    /// binary to an unreachable server, answers false rather than erroring,
    /// so the per-database dumps still run.
    fn can_base_backup(&self) -> bool {
        match self.psql(REPLICATION_CHECK_QUERY) {
            Ok(out) => out.trim() == "1",
            Err(e) => {
                debug!(
                    "Replication privilege check failed for {}: {:#}",
                    self.name, e
                );
                false
            }
        }
    }

    fn dump(&self, database: &str, target_dir: &Path, format: &str, extension: &str) -> Result<()> {
        let dump_path = target_dir.join(format!("{database}.{extension}"));
        let socket = self.socket.display().to_string();

        command::run_command(
            "pg_dump",
            &[
                &format!("--format={format}"),
                "-U",
                &self.user,
                "-h",
                &socket,
                "-f",
                &dump_path.display().to_string(),
                database,
            ],
            &[("PGPASSFILE", self.passfile.as_path())],
        )
        .with_context(|| format!("pg_dump failed for database {database}"))?;

        fs::set_permissions(&dump_path, Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict {}", dump_path.display()))?;
        Ok(())
    }
}

impl BackupExecutor for PostgresExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn client_binaries(&self) -> &'static [&'static str] {
        &["psql", "pg_dump", "pg_basebackup"]
    }

    fn databases(&self) -> Result<Vec<String>> {
        let out = self
            .psql(DB_LIST_QUERY)
            .with_context(|| format!("Failed to list databases for {}", self.name))?;
        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    fn backup_database(&self, database: &str, target_dir: &Path) -> Result<()> {
        self.dump(database, target_dir, "p", "dump")?;
        self.dump(database, target_dir, "c", "pg_dump")?;
        Ok(())
    }

    fn full_backup(&self, target_dir: &Path) -> Result<()> {
        if !self.can_base_backup() {
            warn!(
                "Role {} may not run a base backup of {}; skipping it. \
                 Grant REPLICATION to the role to enable full backups.",
                self.user, self.name
            );
            return Ok(());
        }

        let base_dir = target_dir.join("basebackup");
        if base_dir.exists() {
            fs::remove_dir_all(&base_dir)
                .with_context(|| format!("Failed to remove stale {}", base_dir.display()))?;
        }

        let socket = self.socket.display().to_string();
        command::run_command(
            "pg_basebackup",
            &[
                "-U",
                &self.user,
                "-h",
                &socket,
                "-D",
                &base_dir.display().to_string(),
                "--format=tar",
                "--gzip",
            ],
            &[("PGPASSFILE", self.passfile.as_path())],
        )
        .with_context(|| format!("pg_basebackup failed for {}", self.name))?;

        Ok(())
    }
}
