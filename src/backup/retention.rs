// dbbackup/src/backup/retention.rs
use chrono::{Local, SecondsFormat};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::errors::{BackupError, Result};

/// Reads the name of the previously uploaded backup.
///
/// Returns `None` when the pointer file does not exist or is empty. The
/// content is returned verbatim, without trimming; content that is not
/// UTF-8 is rejected rather than altered.
pub fn read_previous_backup(pointer_file: &Path) -> Result<Option<String>> {
    match fs::read(pointer_file) {
        Ok(bytes) => {
            let name = String::from_utf8(bytes).map_err(|e| BackupError::ReadPointer {
                path: pointer_file.to_path_buf(),
                source: std::io::Error::new(ErrorKind::InvalidData, e),
            })?;
            Ok(Some(name).filter(|n| !n.is_empty()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(BackupError::ReadPointer {
            path: pointer_file.to_path_buf(),
            source,
        }),
    }
}

/// Overwrites the pointer with the current backup's base file name.
pub fn save_current_backup(pointer_file: &Path, file_name: &str) -> Result<()> {
    fs::write(pointer_file, file_name.as_bytes()).map_err(|source| BackupError::WritePointer {
        path: pointer_file.to_path_buf(),
        source,
    })
}

/// Appends `<message> at <timestamp>` to the history log.
pub fn append_to_backup_log(history_file: &Path, message: &str) -> Result<()> {
    let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let write_err = |source| BackupError::WriteHistory {
        path: history_file.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(history_file)
        .map_err(write_err)?;
    writeln!(file, "{} at {}", message, timestamp).map_err(write_err)
}
