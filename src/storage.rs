use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::{config::Builder as S3ConfigBuilder, presigning::PresigningConfig, Client};

use crate::config::S3Config;

/// Blob store holding meal attachments, keyed by meal id.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Removes the object. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Returns a URL that allows a single unauthenticated PUT of `key` for `seconds`.
    async fn presign_put(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub fn new(shared: &SdkConfig, cfg: &S3Config) -> Self {
        let mut builder = S3ConfigBuilder::from(shared);
        if let Some(endpoint) = &cfg.endpoint {
            // MinIO and other S3-compatible stores only speak path-style.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        if let (Some(access_key), Some(secret_key)) = (&cfg.access_key, &cfg.secret_key) {
            builder = builder.credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ));
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: cfg.bucket.clone(),
        }
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    async fn presign_put(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let req = self.client.put_object().bucket(&self.bucket).key(key);
        let presigned = req
            .presigned(PresigningConfig::expires_in(Duration::from_secs(seconds))?)
            .await
            .context("s3 presign_put")?;
        Ok(presigned.uri().to_string())
    }
}

/// Location the object will have once uploaded: the signed URL minus its query string.
pub fn public_object_url(signed_url: &str) -> &str {
    signed_url.split('?').next().unwrap_or(signed_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_strips_signature() {
        let signed = "https://bucket.s3.amazonaws.com/abc?X-Amz-Signature=deadbeef&X-Amz-Expires=300";
        assert_eq!(public_object_url(signed), "https://bucket.s3.amazonaws.com/abc");
    }

    #[test]
    fn public_url_without_query_is_unchanged() {
        assert_eq!(public_object_url("http://minio:9000/b/k"), "http://minio:9000/b/k");
    }
}
