//! Scheduled MySQL backup to S3-compatible storage.
//!
//! Dumps the server, uploads the dump, retires the previous backup object
//! and records outcomes in `backup_history.log`. Meant to be run by cron or
//! a similar job runner; one invocation performs one backup.

// dbbackup/src/main.rs
mod backup;
mod config;
mod errors;

use anyhow::{Context, Result};
use backup::{RunReport, StepOutcome};
use config::{AppConfig, DEFAULT_ENV_FILE};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run_app().await {
        Ok(report) => {
            log_report(&report);
            info!("Backup and upload completed successfully, and the local backup file was deleted.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

async fn run_app() -> Result<RunReport> {
    // An alternate env file may be passed as the only argument.
    let env_file = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
    config::load_env_file(&env_file)?;

    let app_config = AppConfig::from_env();
    app_config.warn_on_incomplete();

    let report = backup::run_backup_flow(&app_config, Path::new("."))
        .await
        .context("Backup process failed")?;
    Ok(report)
}

fn log_report(report: &RunReport) {
    info!(
        key = %report.backup_file_name,
        uploaded = report.upload.is_success(),
        previous = ?report.previous_delete.as_ref().map(|(key, _)| key),
        "backup run finished"
    );
    if let StepOutcome::Failed(e) = &report.upload {
        warn!(key = %report.backup_file_name, error = %e, "backup was not uploaded");
    }
    if let Some((key, StepOutcome::Failed(e))) = &report.previous_delete {
        warn!(key = %key, error = %e, "previous backup is still in the bucket");
    }
}
