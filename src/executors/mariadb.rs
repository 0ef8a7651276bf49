//! MariaDB backup executor
//!
//! MariaDB client tools accept an extra defaults file, and `/dev/stdin` lets
//! it be fed inline: credentials stay in memory instead of joining the shared
//! credentials file on disk.

use super::{BackupExecutor, LoadError};
use crate::config::TargetConfig;
use crate::utils::command;
use anyhow::{Context, Result};
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

const DB_LIST_QUERY: &str = "SHOW DATABASES WHERE `Database` NOT IN \
     ('mysql', 'performance_schema', 'information_schema', 'sys');";

#[derive(Debug)]
pub struct MariadbExecutor {
    name: String,
    defaults: String,
}

impl MariadbExecutor {
    pub fn new(name: String, target: &TargetConfig) -> std::result::Result<Self, LoadError> {
        if !target.socket.exists() {
            return Err(LoadError::SocketNotFound {
                target: name,
                path: target.socket.clone(),
            });
        }

        let defaults = format!(
            "[client]\nsocket={}\nuser={}\npassword={}\n",
            target.socket.display(),
            target.user,
            target.password
        );

        Ok(Self { name, defaults })
    }
}

impl BackupExecutor for MariadbExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn client_binaries(&self) -> &'static [&'static str] {
        &["mariadb", "mariadb-dump"]
    }

    fn databases(&self) -> Result<Vec<String>> {
        let out = command::run_command_with_input(
            "mariadb",
            &[
                "--defaults-extra-file=/dev/stdin",
                "--batch",
                "--skip-column-names",
                "-e",
                DB_LIST_QUERY,
            ],
            &self.defaults,
        )
        .with_context(|| format!("Failed to list databases for {}", self.name))?;

        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    fn backup_database(&self, database: &str, target_dir: &Path) -> Result<()> {
        let dump_path = target_dir.join(format!("{database}.dump"));

        command::run_command_with_input_to_file(
            "mariadb-dump",
            &["--defaults-extra-file=/dev/stdin", database],
            &self.defaults,
            &dump_path,
        )
        .with_context(|| format!("mariadb-dump failed for database {database}"))?;

        fs::set_permissions(&dump_path, Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict {}", dump_path.display()))?;
        Ok(())
    }
}
