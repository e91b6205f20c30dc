// dbbackup/src/config/mod.rs
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PREVIOUS_BACKUP_LOG_FILE: &str = "previous_backup.log";
pub const BACKUP_HISTORY_LOG_FILE: &str = "backup_history.log";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Timestamp embedded in every dump file name.
const DUMP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
}

#[derive(Debug, Clone, Default)]
pub struct SpacesConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket_name: String,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub spaces_config: SpacesConfig,
    pub backup_folder_prefix: String,
    pub backup_file_prefix: String,
}

/// Where a run keeps its files, resolved against a root directory.
#[derive(Debug, Clone)]
pub struct BackupLayout {
    pub backup_dir: PathBuf,
    pub file_prefix: String,
    pub pointer_file: PathBuf,
    pub history_file: PathBuf,
}

impl BackupLayout {
    /// `<file_prefix><YYYYMMDD_HHMMSS>.sql`, also the object key.
    pub fn dump_file_name<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("{}{}.sql", self.file_prefix, now.format(DUMP_TIMESTAMP_FORMAT))
    }

    pub fn dump_file_path(&self, file_name: &str) -> PathBuf {
        self.backup_dir.join(file_name)
    }
}

/// Seeds the process environment from an env file. A missing file is not an
/// error; a malformed one is.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenv::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "loaded environment file");
            Ok(true)
        }
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "no environment file found, using process environment");
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("Error loading {} file", path.display())),
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset keys read
    /// as empty strings; nothing is rejected here, the dependent operation
    /// fails later instead.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        AppConfig {
            database: DatabaseConfig {
                user: get("DB_USER"),
                password: get("DB_PASSWORD"),
                host: get("DB_HOST"),
                port: get("DB_PORT"),
            },
            spaces_config: SpacesConfig {
                access_key_id: get("S3_ACCESS_KEY"),
                secret_access_key: get("S3_SECRET_KEY"),
                region: get("S3_REGION"),
                bucket_name: get("S3_BUCKET_NAME"),
                endpoint_url: Some(get("S3_ENDPOINT")).filter(|s| !s.is_empty()),
            },
            backup_folder_prefix: get("BACKUP_FOLDER_PREFIX"),
            backup_file_prefix: get("BACKUP_FILE_PREFIX"),
        }
    }

    pub fn backup_folder_name(&self) -> String {
        format!("{}backup", self.backup_folder_prefix)
    }

    pub fn layout(&self, root: &Path) -> BackupLayout {
        BackupLayout {
            backup_dir: root.join(self.backup_folder_name()),
            file_prefix: self.backup_file_prefix.clone(),
            pointer_file: root.join(PREVIOUS_BACKUP_LOG_FILE),
            history_file: root.join(BACKUP_HISTORY_LOG_FILE),
        }
    }

    /// Names of settings that are empty. Empty values are allowed through so
    /// the dependent step reports the real failure.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let checks = [
            ("DB_USER", &self.database.user),
            ("DB_PASSWORD", &self.database.password),
            ("DB_HOST", &self.database.host),
            ("DB_PORT", &self.database.port),
            ("S3_ACCESS_KEY", &self.spaces_config.access_key_id),
            ("S3_SECRET_KEY", &self.spaces_config.secret_access_key),
            ("S3_REGION", &self.spaces_config.region),
            ("S3_BUCKET_NAME", &self.spaces_config.bucket_name),
        ];
        checks
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn warn_on_incomplete(&self) {
        let missing = self.missing_settings();
        if !missing.is_empty() {
            warn!(?missing, "some settings are empty; the steps that need them will fail");
        }
        if let Some(endpoint) = &self.spaces_config.endpoint_url {
            if let Err(e) = url::Url::parse(endpoint) {
                warn!(endpoint = %endpoint, error = %e, "S3_ENDPOINT does not parse as a URL");
            }
        }
    }
}
