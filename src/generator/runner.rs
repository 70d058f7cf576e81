//! 带会话检查点的工作流运行器

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, info};

use crate::checkpoint::{Checkpoint, CheckpointStore, checkpoint_key};
use crate::config::CommitPolicy;
use crate::generator::graph::CompiledGraph;
use crate::generator::types::WorkflowError;

/// 可以跨请求延续的工作流状态
pub trait SessionState: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// 为false时不读取也不提交检查点
    const PERSIST: bool = true;

    /// 合并同一会话上一次提交的快照
    fn carry_forward(&mut self, previous: Option<Self>);
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunOutcome<S> {
    pub session_id: String,
    pub state: S,
    pub path: Vec<String>,
}

pub struct WorkflowRunner<S> {
    graph: CompiledGraph<S>,
    store: Arc<dyn CheckpointStore>,
    policy: CommitPolicy,
}

impl<S: SessionState> WorkflowRunner<S> {
    pub fn new(graph: CompiledGraph<S>, store: Arc<dyn CheckpointStore>, policy: CommitPolicy) -> Self {
        Self {
            graph,
            store,
            policy,
        }
    }

    pub fn workflow(&self) -> &str {
        self.graph.name()
    }

    /// 会话最近一次提交的状态
    pub async fn latest_state(&self, session_id: &str) -> Result<Option<S>, WorkflowError> {
        let key = checkpoint_key(self.graph.name(), session_id);
        match self.store.load(&key).await? {
            Some(checkpoint) => Ok(Some(serde_json::from_value(checkpoint.state)?)),
            None => Ok(None),
        }
    }

    /// 载入会话记忆后从入口节点完整执行一遍
    pub async fn run(&self, session_id: &str, mut initial: S) -> Result<RunOutcome<S>, WorkflowError> {
        let previous = if S::PERSIST {
            self.latest_state(session_id).await?
        } else {
            None
        };
        debug!(
            "📂 会话 {} {}",
            session_id,
            if previous.is_some() { "已有记忆" } else { "首次运行" }
        );
        initial.carry_forward(previous);

        let mut state = initial;
        let mut path: Vec<String> = Vec::new();
        let mut current = self.graph.entry().to_string();

        loop {
            info!("🤖 执行节点 [{}] {}", self.graph.name(), current);
            state = self.graph.run_node(&current, state).await?;
            path.push(current.clone());

            if self.policy == CommitPolicy::EveryNode {
                self.commit(session_id, &current, path.len(), &state).await?;
            }

            match self.graph.next(&current, &state)? {
                Some(next) => current = next.to_string(),
                None => break,
            }
        }

        if self.policy == CommitPolicy::OnSuccess {
            self.commit(session_id, &current, path.len(), &state).await?;
        }
        info!("✅ 工作流 {} 完成，共 {} 个节点", self.graph.name(), path.len());

        Ok(RunOutcome {
            session_id: session_id.to_string(),
            state,
            path,
        })
    }

    async fn commit(
        &self,
        session_id: &str,
        node: &str,
        step: usize,
        state: &S,
    ) -> Result<(), WorkflowError> {
        if !S::PERSIST {
            return Ok(());
        }
        let checkpoint = Checkpoint {
            workflow: self.graph.name().to_string(),
            session_id: session_id.to_string(),
            step: step as u32,
            node: node.to_string(),
            state: serde_json::to_value(state)?,
            saved_at: Utc::now(),
        };
        self.store
            .save(&checkpoint_key(self.graph.name(), session_id), checkpoint)
            .await?;
        Ok(())
    }
}
