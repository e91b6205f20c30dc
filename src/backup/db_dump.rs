// dbbackup/src/backup/db_dump.rs
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;
use which::which;

use crate::config::DatabaseConfig;
use crate::errors::DumpError;

/// Produces a full database dump at `destination`.
#[async_trait]
pub trait DumpProducer: Send + Sync {
    async fn produce(&self, destination: &Path) -> Result<(), DumpError>;
}

fn find_mysqldump_executable() -> Result<PathBuf, DumpError> {
    Ok(which("mysqldump")?)
}

/// Dumps every database on the server with `mysqldump --all-databases`.
pub struct MysqlDump {
    database: DatabaseConfig,
}

impl MysqlDump {
    pub fn new(database: DatabaseConfig) -> Self {
        MysqlDump { database }
    }

    fn args(&self, destination: &Path) -> Vec<OsString> {
        let db = &self.database;
        vec![
            "--all-databases".into(),
            format!("-u{}", db.user).into(),
            format!("-p{}", db.password).into(),
            format!("-h{}", db.host).into(),
            format!("-P{}", db.port).into(),
            "-r".into(),
            destination.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl DumpProducer for MysqlDump {
    async fn produce(&self, destination: &Path) -> Result<(), DumpError> {
        let mysqldump_path = find_mysqldump_executable()?;
        info!(
            host = %self.database.host,
            port = %self.database.port,
            destination = %destination.display(),
            "🔍 Dumping all databases with mysqldump"
        );

        // stdout and stderr are inherited so mysqldump's own diagnostics reach the caller.
        let status = Command::new(&mysqldump_path)
            .args(self.args(destination))
            .status()
            .map_err(DumpError::Spawn)?;

        if !status.success() {
            return Err(DumpError::Exit(status));
        }
        info!(destination = %destination.display(), "✓ Dump written");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::DumpProducer;
    use crate::errors::DumpError;
    use async_trait::async_trait;
    use std::os::unix::process::ExitStatusExt;
    use std::path::Path;
    use std::process::ExitStatus;

    enum Behaviour {
        Write(Vec<u8>),
        Exit(i32),
        Directory,
    }

    /// Stands in for mysqldump.
    pub struct FakeDump {
        behaviour: Behaviour,
    }

    impl FakeDump {
        pub fn writing(content: &[u8]) -> Self {
            FakeDump {
                behaviour: Behaviour::Write(content.to_vec()),
            }
        }

        /// Exits with status 2 without writing anything, like mysqldump
        /// when the server is unreachable.
        pub fn failing() -> Self {
            FakeDump {
                behaviour: Behaviour::Exit(2),
            }
        }

        /// Leaves a directory where the dump file should be, so reading or
        /// removing it later fails.
        pub fn leaving_directory() -> Self {
            FakeDump {
                behaviour: Behaviour::Directory,
            }
        }
    }

    #[async_trait]
    impl DumpProducer for FakeDump {
        async fn produce(&self, destination: &Path) -> Result<(), DumpError> {
            match &self.behaviour {
                Behaviour::Write(content) => {
                    std::fs::write(destination, content).expect("fake dump could not write its file")
                }
                Behaviour::Exit(code) => return Err(DumpError::Exit(ExitStatus::from_raw(*code << 8))),
                Behaviour::Directory => {
                    std::fs::create_dir(destination).expect("fake dump could not create its directory")
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysqldump_arguments() {
        let dump = MysqlDump::new(DatabaseConfig {
            user: "backup".to_string(),
            password: "p@ss".to_string(),
            host: "10.0.0.5".to_string(),
            port: "3307".to_string(),
        });

        let args = dump.args(Path::new("prod_backup/shop_20240101_010203.sql"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--all-databases",
                "-ubackup",
                "-pp@ss",
                "-h10.0.0.5",
                "-P3307",
                "-r",
                "prod_backup/shop_20240101_010203.sql",
            ]
        );
    }
}
