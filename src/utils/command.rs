//! Utilities for running database client tools with proper error handling
//!
//! All helpers spawn-and-wait; there is no timeout, so a hung client tool
//! hangs the run.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::{debug, error};

/// Run a command to completion, capturing stdout and requiring a zero exit
/// status.
pub fn run_command(program: &str, args: &[&str], env: &[(&str, &Path)]) -> Result<Output> {
    let mut cmd = base_command(program, args, env);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    wait_checked(cmd, program, None)
}

/// Run a command and return its stdout as a string.
pub fn run_command_stdout(program: &str, args: &[&str], env: &[(&str, &Path)]) -> Result<String> {
    let output = run_command(program, args, env)?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a command with `input` fed on stdin and return its stdout as a string.
pub fn run_command_with_input(program: &str, args: &[&str], input: &str) -> Result<String> {
    let mut cmd = base_command(program, args, &[]);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    let output = wait_checked(cmd, program, Some(input))?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a command with `input` fed on stdin and stdout written directly to
/// `dest`.
pub fn run_command_with_input_to_file(
    program: &str,
    args: &[&str],
    input: &str,
    dest: &Path,
) -> Result<()> {
    let file = File::create(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut cmd = base_command(program, args, &[]);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::from(file));
    wait_checked(cmd, program, Some(input))?;
    Ok(())
}

fn base_command(program: &str, args: &[&str], env: &[(&str, &Path)]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.stderr(Stdio::piped());
    cmd
}

fn wait_checked(mut cmd: Command, program: &str, input: Option<&str>) -> Result<Output> {
    let rendered: Vec<_> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    debug!("Running command: {} {}", program, rendered.join(" "));

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to execute {}", program))?;

    if let Some(data) = input {
        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("Stdin of {} was not captured", program))?;
        stdin
            .write_all(data.as_bytes())
            .with_context(|| format!("Failed to write to stdin of {}", program))?;
        // stdin is dropped here, closing the pipe
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to execute {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("Command failed: {} {}", program, rendered.join(" "));
        error!("Stderr: {}", stderr);
        anyhow::bail!(
            "{} exited with code {:?}: {}",
            program,
            output.status.code(),
            stderr.trim()
        );
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_stdout() {
        let out = run_command_stdout("echo", &["hello"], &[]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_run_command_passes_env() {
        let out = run_command_stdout(
            "sh",
            &["-c", "printf %s \"$PGPASSFILE\""],
            &[("PGPASSFILE", Path::new("/tmp/creds"))],
        )
        .unwrap();
        assert_eq!(out, "/tmp/creds");
    }

    #[test]
    fn test_run_command_with_input() {
        let out = run_command_with_input("cat", &[], "[client]\nuser=u\n").unwrap();
        assert_eq!(out, "[client]\nuser=u\n");
    }

    #[test]
    fn test_run_command_with_input_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        run_command_with_input_to_file("cat", &[], "dumped\n", &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "dumped\n");
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let err = run_command("false", &[], &[]).unwrap_err();
        assert!(err.to_string().contains("false"));
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        assert!(run_command("dbackup-no-such-binary", &[], &[]).is_err());
    }
}
