use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
};

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;

/// S3兼容存储，默认连接Cloudflare R2
pub struct S3ObjectStore {
    config: StorageConfig,
    client: Option<Client>,
}

impl S3ObjectStore {
    /// 配置不完整时不创建客户端，首次上传时报错
    pub fn new(config: &StorageConfig) -> Self {
        let client = config
            .missing_fields()
            .is_empty()
            .then(|| build_client(config));
        Self {
            config: config.clone(),
            client,
        }
    }
}

fn build_client(config: &StorageConfig) -> Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None, // expiry
        "genui-storage",
    );

    let s3_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .endpoint_url(config.resolved_endpoint())
        .credentials_provider(credentials)
        .force_path_style(true)
        .build();

    Client::from_conf(s3_config)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn check_ready(&self) -> Result<(), StorageError> {
        let missing = self.config.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::MissingConfig(missing))
        }
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| StorageError::MissingConfig(self.config.missing_fields()))?;

        client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}
