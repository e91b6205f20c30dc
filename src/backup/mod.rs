mod logic;
pub(crate) mod db_dump;
pub(crate) mod retention;
pub(crate) mod s3_storage;

use chrono::Local;
use std::path::Path;

use crate::config::AppConfig;
use crate::errors::Result;
use db_dump::MysqlDump;
use s3_storage::S3Storage;

pub use logic::{RunReport, StepOutcome};

/// Public entry point for the backup process: wires the real `mysqldump`
/// and S3 collaborators into the workflow, rooted at `work_dir`.
pub async fn run_backup_flow(app_config: &AppConfig, work_dir: &Path) -> Result<RunReport> {
    let layout = app_config.layout(work_dir);
    let dumper = MysqlDump::new(app_config.database.clone());
    let store = S3Storage::connect(&app_config.spaces_config).await;

    logic::perform_backup_orchestration(&layout, &dumper, &store, Local::now()).await
}
