//! 会话检查点：按`{workflow}:{session_id}`保存工作流状态快照

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{CheckpointBackend, CheckpointConfig};

mod file;
mod memory;

pub use file::FileCheckpointStore;
pub use memory::{DEFAULT_EXPIRE_HOURS, DEFAULT_MAX_SESSIONS, InMemoryCheckpointStore};

/// 一份持久化的状态快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub workflow: String,
    pub session_id: String,
    /// 本次运行中已完成的节点数
    pub step: u32,
    /// 最后完成的节点
    pub node: String,
    pub state: Value,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// 检查点存储，读写均按完整key进行，不做加锁
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Checkpoint>, CheckpointError>;

    async fn save(&self, key: &str, checkpoint: Checkpoint) -> Result<(), CheckpointError>;
}

pub fn checkpoint_key(workflow: &str, session_id: &str) -> String {
    format!("{}:{}", workflow, session_id)
}

/// 根据配置创建检查点存储
pub fn build_store(config: &CheckpointConfig) -> Arc<dyn CheckpointStore> {
    match config.backend {
        CheckpointBackend::Memory => Arc::new(InMemoryCheckpointStore::with_limits(
            config.max_sessions,
            config.expire_hours,
        )),
        CheckpointBackend::File => Arc::new(FileCheckpointStore::new(config.dir.clone())),
    }
}
