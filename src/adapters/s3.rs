use crate::config::toml_config::AwsConfig;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// 以設定檔中的靜態金鑰建立 client
    pub async fn from_config(aws: &AwsConfig, bucket: &str) -> Self {
        let credentials = Credentials::new(aws.key.clone(), aws.secret.clone(), None, None, "etl-config");
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(aws.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self::new(S3Client::new(&sdk_config), bucket.to_string())
    }
}

impl Storage for S3Storage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                EtlError::StorageError {
                    message: format!(
                        "Failed to write s3://{}/{}: {} ({})",
                        self.bucket,
                        path,
                        service_error.message().unwrap_or("unknown error"),
                        service_error.code().unwrap_or("no code")
                    ),
                }
            })?;

        tracing::debug!("Uploaded s3://{}/{} ({} bytes)", self.bucket, path, data.len());
        Ok(())
    }
}
