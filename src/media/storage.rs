/**
 * Object Storage Client
 *
 * Thin wrapper around the S3 SDK for uploading files to an
 * S3-compatible store (MinIO locally, S3 in production).
 *
 * # Public URLs
 *
 * Objects are addressed as `{public_base}/{bucket}/{key}`. The public
 * base defaults to the endpoint URL; deployments where the endpoint
 * host is internal (e.g. `http://minio:9000` inside docker-compose) set
 * `S3_PUBLIC_URL` to a browser-reachable base instead.
 */
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
}

/// Handle to one bucket of an S3-compatible store.
#[derive(Debug)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    public_base: String,
}

impl ObjectStorage {
    /// Build a client from static credentials.
    ///
    /// `force_path_style` keeps bucket addressing compatible with MinIO,
    /// which does not serve virtual-host-style requests by default.
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        );

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint_url)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let public_base = config
            .public_url
            .clone()
            .unwrap_or_else(|| config.endpoint_url.clone());

        ObjectStorage {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    /// Generate a unique object key, keeping the original file extension
    /// so browsers can guess the content type from the URL.
    pub fn object_key(filename: Option<&str>) -> String {
        let extension = filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.len() <= 10)
            .unwrap_or("bin");

        format!("{}.{}", Uuid::new_v4(), extension)
    }

    /// The public URL of an object.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, key)
    }

    /// Upload a file and return its public URL.
    pub async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("object upload failed: {e}");
                StorageError::Upload(e.to_string())
            })?;

        tracing::info!("uploaded object {} to bucket {}", key, self.bucket);
        Ok(self.object_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    fn test_config() -> StorageConfig {
        StorageConfig {
            endpoint_url: "http://localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "avatars".to_string(),
            public_url: None,
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_object_key_keeps_extension() {
        let key = ObjectStorage::object_key(Some("avatar.png"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_object_key_without_extension() {
        assert!(ObjectStorage::object_key(Some("avatar")).ends_with(".bin"));
        assert!(ObjectStorage::object_key(None).ends_with(".bin"));
    }

    #[test]
    fn test_object_key_is_unique() {
        let a = ObjectStorage::object_key(Some("avatar.png"));
        let b = ObjectStorage::object_key(Some("avatar.png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_object_url_uses_public_base() {
        let mut config = test_config();
        config.public_url = Some("http://localhost:9000/".to_string());
        let storage = ObjectStorage::new(&config);
        assert_eq!(
            storage.object_url("abc.png"),
            "http://localhost:9000/avatars/abc.png"
        );
    }

    #[test]
    fn test_object_url_falls_back_to_endpoint() {
        let storage = ObjectStorage::new(&test_config());
        assert!(storage.object_url("abc.png").starts_with("http://localhost:9000/avatars/"));
    }
}
