use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::generator::graph::GraphError;
use crate::llm::ModelError;

/// 工作流节点或运行器的失败
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("node `{node}` failed to call the model: {source}")]
    Model {
        node: &'static str,
        #[source]
        source: ModelError,
    },

    #[error("node `{node}` produced invalid output: {reason}")]
    InvalidOutput { node: &'static str, reason: String },

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("workflow state could not be encoded: {0}")]
    State(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl WorkflowError {
    pub fn model(node: &'static str, source: ModelError) -> Self {
        WorkflowError::Model { node, source }
    }

    pub fn invalid(node: &'static str, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidOutput {
            node,
            reason: reason.into(),
        }
    }
}

/// 会话中的一次提问
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub asked_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn now(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            asked_at: Utc::now(),
        }
    }
}

/// 跨请求累积的会话记忆：历史提问与此前生成的产物
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMemory<A> {
    pub history: Vec<ConversationTurn>,
    pub artifacts: Vec<A>,
}

impl<A> Default for SessionMemory<A> {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            artifacts: Vec::new(),
        }
    }
}

impl<A> SessionMemory<A> {
    /// 接上一轮的记忆，并记下本轮提问
    pub fn resume(&mut self, previous: Option<SessionMemory<A>>, question: &str) {
        if let Some(previous) = previous {
            self.history = previous.history;
            self.artifacts = previous.artifacts;
        }
        self.history.push(ConversationTurn::now(question));
    }

    pub fn record(&mut self, artifact: A) {
        self.artifacts.push(artifact);
    }

    /// 本轮之前的提问
    pub fn earlier_questions(&self) -> impl Iterator<Item = &str> {
        let earlier = self.history.len().saturating_sub(1);
        self.history[..earlier].iter().map(|t| t.question.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_without_previous_starts_fresh() {
        let mut memory: SessionMemory<String> = SessionMemory::default();
        memory.resume(None, "first");

        assert_eq!(memory.history.len(), 1);
        assert!(memory.artifacts.is_empty());
        assert_eq!(memory.earlier_questions().count(), 0);
    }

    #[test]
    fn test_resume_carries_history_and_artifacts() {
        let mut first: SessionMemory<String> = SessionMemory::default();
        first.resume(None, "first");
        first.record("artifact-1".to_string());

        let mut second = SessionMemory::default();
        second.resume(Some(first), "second");

        let questions: Vec<_> = second.history.iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "second"]);
        assert_eq!(second.artifacts, vec!["artifact-1".to_string()]);
        assert_eq!(second.earlier_questions().collect::<Vec<_>>(), vec!["first"]);
    }
}
