use async_trait::async_trait;
use md5::{Digest, Md5};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use super::{Checkpoint, CheckpointError, CheckpointStore};

/// 以JSON文件保存检查点，文件名为key的MD5哈希
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn hash_key(key: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn checkpoint_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::hash_key(key)))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, key: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let path = self.checkpoint_path(key);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save(&self, key: &str, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.checkpoint_path(key);
        // 每次保存使用独立的临时文件，并发写同一会话时后写者覆盖先写者
        let staging = self.dir.join(format!(
            "{}.{}.tmp",
            Self::hash_key(key),
            Uuid::new_v4().simple()
        ));
        let content = serde_json::to_string_pretty(&checkpoint)?;

        fs::write(&staging, content).await?;
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }
}
