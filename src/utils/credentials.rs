//! Shared credentials file with a scoped lifetime
//!
//! PostgreSQL client tools read passwords from a pgpass-style file. One such
//! file is shared by every PostgreSQL target of a run: created empty before
//! executors are constructed, appended to as they are, and removed when the
//! run ends. The fixed path makes concurrent runs of the program unsafe; that
//! is a documented limitation, not something this module guards against.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Guard over the shared credentials file.
///
/// The file exists for exactly as long as the guard does: [`acquire`] creates
/// it empty with owner-only permissions, and dropping the guard removes it,
/// on every exit path.
///
/// [`acquire`]: CredentialsFile::acquire
pub struct CredentialsFile {
    path: PathBuf,
    released: bool,
}

impl CredentialsFile {
    /// Create or truncate the credentials file and restrict it to owner
    /// read/write.
    ///
    /// Callers treat a failure here as fatal: continuing could leave the run
    /// authenticating through a stale or world-readable file.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create credentials file {}", path.display()))?;
        file.set_permissions(Permissions::from_mode(0o600))
            .with_context(|| {
                format!("Failed to restrict credentials file {}", path.display())
            })?;

        debug!("Created credentials file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `socket:*:*:user:password` entry.
    ///
    /// Fields are written verbatim; the format is fixed by the consuming
    /// tools, so `:` or `\` in user or password yields an ambiguous entry.
    pub fn append_entry(&self, socket: &Path, user: &str, password: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}:*:*:{}:{}", socket.display(), user, password)
    }

    /// Remove the credentials file.
    ///
    /// Idempotent: an already-missing file is success. Any other removal
    /// error is logged and swallowed so cleanup never masks the run's real
    /// outcome.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed credentials file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => error!(
                "Error while removing credentials file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for CredentialsFile {
    fn drop(&mut self) {
        self.release();
    }
}
