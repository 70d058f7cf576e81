//! 对象存储：把打包好的产物写入S3兼容的bucket并返回公开链接

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::artifact::PackagedArtifact;
use crate::config::StorageConfig;
use crate::utils::retry::{RetryPolicy, retry_with_backoff};

mod memory;
mod s3;

pub use memory::{MemoryObjectStore, StoredObject};
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage is not configured, missing: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("failed to upload `{key}`: {reason}")]
    Upload { key: String, reason: String },
}

/// 只追加写入的对象存储
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 在发起任何网络请求之前校验配置
    fn check_ready(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// 新的产物目录名，形如`artifact-20250101120000-<uuid>`
pub fn new_artifact_key() -> String {
    format!(
        "artifact-{}-{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple()
    )
}

/// 产物上传器
#[derive(Clone)]
pub struct ArtifactUploader {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
    retry: RetryPolicy,
}

impl ArtifactUploader {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into(),
            retry,
        }
    }

    /// 使用配置中的S3/R2存储
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            Arc::new(S3ObjectStore::new(config)),
            config.public_base_url.clone(),
            RetryPolicy::new(config.retry_attempts, config.retry_delay_ms),
        )
    }

    /// 上传三个文件，返回index.html的公开地址
    ///
    /// 中途失败不会回滚已写入的文件。
    pub async fn upload(&self, artifact: &PackagedArtifact) -> Result<String, StorageError> {
        self.store.check_ready()?;
        let base_url = self.public_base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(StorageError::MissingConfig(vec!["public_base_url"]));
        }

        let prefix = new_artifact_key();
        for (name, body, content_type) in artifact.files() {
            let key = format!("{}/{}", prefix, name);
            retry_with_backoff(self.retry, "上传对象", || {
                self.store
                    .put_object(&key, body.as_bytes().to_vec(), content_type)
            })
            .await?;
            debug!("📤 已上传 {} ({} bytes)", key, body.len());
        }

        let url = format!("{}/{}/index.html", base_url, prefix);
        info!("✅ 产物已发布: {}", url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests;
