use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that abort a backup run. Anything surfaced as a `BackupError`
/// terminates the process with a non-zero exit code.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Error creating backup folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error backing up MySQL: {0}")]
    Dump(#[from] DumpError),

    #[error("Failed to read previous backup log {path}: {source}")]
    ReadPointer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write current backup to log {path}: {source}")]
    WritePointer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to backup history log {path}: {source}")]
    WriteHistory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error deleting local backup file {path}: {source}")]
    DeleteLocal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the external dump utility.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("mysqldump executable not found in PATH: {0}")]
    NotFound(#[from] which::Error),

    #[error("failed to execute mysqldump: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("mysqldump exited with {0}")]
    Exit(ExitStatus),
}

/// Object storage failures. These never abort a run; the workflow records
/// them in the history log and carries on.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload to S3: {0}")]
    Upload(String),

    #[error("failed to delete S3 file: {0}")]
    Delete(String),
}

pub type Result<T> = std::result::Result<T, BackupError>;
