use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Checkpoint, CheckpointError, CheckpointStore};

/// 默认最多保留的会话快照数量
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// 默认快照过期时间（小时）
pub const DEFAULT_EXPIRE_HOURS: u64 = 24;

/// 进程内检查点存储，重启后丢失
///
/// 超过`expire_hours`未更新的快照视为过期；数量达到上限时淘汰最久未更新的快照
#[derive(Debug)]
pub struct InMemoryCheckpointStore {
    data: RwLock<HashMap<String, Checkpoint>>,
    max_sessions: usize,
    expire_hours: u64,
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_EXPIRE_HOURS)
    }
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_sessions: usize, expire_hours: u64) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            expire_hours,
        }
    }

    fn is_expired(&self, checkpoint: &Checkpoint) -> bool {
        let age = Utc::now().signed_duration_since(checkpoint.saved_at);
        age > Duration::hours(self.expire_hours as i64)
    }

    /// 当前保留的快照数量
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// 指定工作流下已有检查点的会话
    pub async fn sessions(&self, workflow: &str) -> Vec<String> {
        let prefix = format!("{}:", workflow);
        let data = self.data.read().await;
        let mut sessions: Vec<String> = data
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect();
        sessions.sort();
        sessions
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, key: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let data = self.data.read().await;
        Ok(data
            .get(key)
            .filter(|checkpoint| !self.is_expired(checkpoint))
            .cloned())
    }

    async fn save(&self, key: &str, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        let mut data = self.data.write().await;

        if !data.contains_key(key) {
            let before = data.len();
            data.retain(|_, existing| !self.is_expired(existing));
            if data.len() < before {
                debug!("🧹 清理了 {} 个过期会话快照", before - data.len());
            }

            while data.len() >= self.max_sessions {
                let oldest = data
                    .iter()
                    .min_by_key(|(_, existing)| existing.saved_at)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(oldest) => {
                        debug!("🧹 会话快照已达上限，淘汰 {}", oldest);
                        data.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        data.insert(key.to_string(), checkpoint);
        Ok(())
    }
}
