// dbbackup/src/backup/s3_storage.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::config::{Credentials, Region};
use s3::error::DisplayErrorContext;
use s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::config::SpacesConfig;
use crate::errors::StorageError;

/// Key-value object storage as the backup workflow sees it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}

/// An S3-compatible bucket reached with static credentials.
///
/// Path-style addressing is always on so that MinIO, Spaces and similar
/// stores behind a custom endpoint resolve the bucket correctly.
pub struct S3Storage {
    client: s3::Client,
    bucket_name: String,
}

impl S3Storage {
    pub async fn connect(spaces_config: &SpacesConfig) -> Self {
        let sdk_config = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .region(Region::new(spaces_config.region.clone()))
            .credentials_provider(Credentials::new(
                &spaces_config.access_key_id,
                &spaces_config.secret_access_key,
                None, // session_token
                None, // expiry
                "Static",
            ))
            .load()
            .await;

        let mut config_builder = s3::config::Builder::from(&sdk_config).force_path_style(true);
        if let Some(endpoint) = &spaces_config.endpoint_url {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        debug!(
            bucket = %spaces_config.bucket_name,
            region = %spaces_config.region,
            endpoint = ?spaces_config.endpoint_url,
            "configured S3 client"
        );

        S3Storage {
            client: s3::Client::from_conf(config_builder.build()),
            bucket_name: spaces_config.bucket_name.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(&e).to_string()))?;

        info!(bucket = %self.bucket_name, key, size, "✅ uploaded object");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(DisplayErrorContext(&e).to_string()))?;

        info!(bucket = %self.bucket_name, key, "Deleted previous backup from S3");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::ObjectStore;
    use crate::errors::StorageError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StoreCall {
        Put { key: String, body: Vec<u8> },
        Delete { key: String },
    }

    #[derive(Default)]
    struct FakeStoreState {
        calls: Vec<StoreCall>,
        fail_put: Option<String>,
        fail_delete: Option<String>,
    }

    /// Records every call and fails on demand.
    #[derive(Clone, Default)]
    pub struct FakeObjectStore {
        inner: Arc<Mutex<FakeStoreState>>,
    }

    impl FakeObjectStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_uploads_with(&self, message: &str) {
            self.inner.lock().fail_put = Some(message.to_string());
        }

        pub fn fail_deletes_with(&self, message: &str) {
            self.inner.lock().fail_delete = Some(message.to_string());
        }

        pub fn calls(&self) -> Vec<StoreCall> {
            self.inner.lock().calls.clone()
        }

        pub fn deleted_keys(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    StoreCall::Delete { key } => Some(key),
                    StoreCall::Put { .. } => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl ObjectStore for FakeObjectStore {
        async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
            let mut state = self.inner.lock();
            state.calls.push(StoreCall::Put {
                key: key.to_string(),
                body,
            });
            match &state.fail_put {
                Some(message) => Err(StorageError::Upload(message.clone())),
                None => Ok(()),
            }
        }

        async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
            let mut state = self.inner.lock();
            state.calls.push(StoreCall::Delete {
                key: key.to_string(),
            });
            match &state.fail_delete {
                Some(message) => Err(StorageError::Delete(message.clone())),
                None => Ok(()),
            }
        }
    }
}
