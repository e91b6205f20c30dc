// dbbackup/src/backup/logic.rs
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::db_dump::DumpProducer;
use super::retention::{append_to_backup_log, read_previous_backup, save_current_backup};
use super::s3_storage::ObjectStore;
use crate::config::BackupLayout;
use crate::errors::{BackupError, Result, StorageError};

/// Outcome of a soft step: it either worked or left an error in the history log.
#[derive(Debug)]
pub enum StepOutcome {
    Succeeded,
    Failed(StorageError),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// What a completed run did.
#[derive(Debug)]
pub struct RunReport {
    pub backup_file_name: String,
    pub upload: StepOutcome,
    /// Key of the superseded object and the delete outcome, if there was one.
    pub previous_delete: Option<(String, StepOutcome)>,
}

/// Creates the backup folder if it does not exist yet.
pub fn create_backup_folder(backup_dir: &Path) -> Result<()> {
    if backup_dir.exists() {
        return Ok(());
    }
    fs::create_dir(backup_dir).map_err(|source| BackupError::CreateFolder {
        path: backup_dir.to_path_buf(),
        source,
    })?;
    info!(folder = %backup_dir.display(), "📂 Backup folder created");
    Ok(())
}

async fn upload_dump<S: ObjectStore>(
    store: &S,
    dump_path: &Path,
    key: &str,
) -> std::result::Result<(), StorageError> {
    let body = tokio::fs::read(dump_path)
        .await
        .map_err(|source| StorageError::ReadFile {
            path: dump_path.to_path_buf(),
            source,
        })?;
    store.put_object(key, body).await
}

/// Runs one backup: dump, upload, retire the previous object, move the
/// pointer, remove the local dump.
///
/// Storage failures are written to the history log and reported in the
/// returned [`RunReport`]; every other failure aborts the run.
pub async fn perform_backup_orchestration<D, S>(
    layout: &BackupLayout,
    dumper: &D,
    store: &S,
    now: DateTime<Local>,
) -> Result<RunReport>
where
    D: DumpProducer,
    S: ObjectStore,
{
    create_backup_folder(&layout.backup_dir)?;

    let backup_file_name = layout.dump_file_name(&now);
    let dump_path = layout.dump_file_path(&backup_file_name);

    dumper.produce(&dump_path).await?;

    let previous_backup = read_previous_backup(&layout.pointer_file)?;

    info!(file = %dump_path.display(), key = %backup_file_name, "🚀 Uploading backup");
    let upload = match upload_dump(store, &dump_path, &backup_file_name).await {
        Ok(()) => {
            append_to_backup_log(
                &layout.history_file,
                &format!("Successfully uploaded backup: {}", dump_path.display()),
            )?;
            StepOutcome::Succeeded
        }
        Err(e) => {
            warn!(file = %dump_path.display(), error = %e, "Error uploading to S3");
            append_to_backup_log(
                &layout.history_file,
                &format!("Failed to upload backup: {}, error: {}", dump_path.display(), e),
            )?;
            StepOutcome::Failed(e)
        }
    };

    // Attempted whatever the upload outcome was.
    let previous_delete = match previous_backup {
        Some(previous) => {
            let outcome = match store.delete_object(&previous).await {
                Ok(()) => {
                    append_to_backup_log(
                        &layout.history_file,
                        &format!("Successfully deleted previous backup: {}", previous),
                    )?;
                    StepOutcome::Succeeded
                }
                Err(e) => {
                    warn!(key = %previous, error = %e, "Error deleting previous backup file from S3");
                    append_to_backup_log(
                        &layout.history_file,
                        &format!("Failed to delete previous backup: {}, error: {}", previous, e),
                    )?;
                    StepOutcome::Failed(e)
                }
            };
            Some((previous, outcome))
        }
        None => None,
    };

    // The pointer always moves to the new dump, even when its upload failed.
    save_current_backup(&layout.pointer_file, &backup_file_name)?;

    fs::remove_file(&dump_path).map_err(|source| BackupError::DeleteLocal {
        path: dump_path.clone(),
        source,
    })?;
    info!(file = %dump_path.display(), "Successfully deleted local backup file");

    Ok(RunReport {
        backup_file_name,
        upload,
        previous_delete,
    })
}
