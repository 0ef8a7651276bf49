use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::error;

/// Shared pgpass-style credentials file, scoped to one invocation. The fixed
/// path makes concurrent runs unsafe.
const CREDENTIALS_PATH: &str = "/tmp/dbackup.pgpass";

#[derive(Parser)]
#[command(name = "dbackup")]
#[command(about = "Back up PostgreSQL and MariaDB servers with their native dump tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving one subdirectory per backup target
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Usage errors exit 1; clap's default of 2 does not fit the exit-code
    // contract here.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return Ok(());
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    dbackup::logging::init();

    // Environment variables take precedence over the CLI flags.
    let config_path = std::env::var_os("DBACKUP_CONFIG_PATH")
        .map(PathBuf::from)
        .or(cli.config);
    let output_dir = std::env::var_os("DBACKUP_OUTPUT_DIR")
        .map(PathBuf::from)
        .or(cli.output_dir);

    let Some(config_path) = config_path else {
        error!(
            "Configuration path was not specified, use the CLI or set the \
             DBACKUP_CONFIG_PATH environment variable"
        );
        std::process::exit(1);
    };
    let Some(output_dir) = output_dir else {
        error!(
            "Output directory was not specified, use the CLI or set the \
             DBACKUP_OUTPUT_DIR environment variable"
        );
        std::process::exit(1);
    };

    let config = match dbackup::config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Error during configuration parsing: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dbackup::orchestrator::run(&config, &output_dir, Path::new(CREDENTIALS_PATH)) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
