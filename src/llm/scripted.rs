//! 脚本化模型：按预设回复应答，记录收到的全部消息

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::client::types::{ChatMessage, ChatModel, ModelError};

enum Reply {
    Text(String),
    Fail(fn() -> ModelError),
}

impl Reply {
    fn resolve(&self) -> Result<String, ModelError> {
        match self {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(make) => Err(make()),
        }
    }
}

/// 不依赖网络的[`ChatModel`]实现
///
/// 规则回复（消息中包含指定片段时命中）优先于排队回复；规则可重复命中，
/// 排队回复按先进先出各消费一次。两者都没有时返回`Transport`错误。
#[derive(Default)]
pub struct ScriptedModel {
    rules: Mutex<Vec<(String, Reply)>>,
    queue: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条排队的文本回复
    pub fn push_reply(self, reply: impl Into<String>) -> Self {
        self.lock_queue().push_back(Reply::Text(reply.into()));
        self
    }

    /// 追加一条排队的结构化回复
    pub fn push_json(self, value: serde_json::Value) -> Self {
        self.push_reply(value.to_string())
    }

    /// 追加一条排队的失败
    pub fn push_failure(self, make: fn() -> ModelError) -> Self {
        self.lock_queue().push_back(Reply::Fail(make));
        self
    }

    /// 任一消息包含`needle`时返回`reply`
    pub fn on_contains(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.lock_rules()
            .push((needle.into(), Reply::Text(reply.into())));
        self
    }

    /// 任一消息包含`needle`时失败
    pub fn fail_on_contains(self, needle: impl Into<String>, make: fn() -> ModelError) -> Self {
        self.lock_rules().push((needle.into(), Reply::Fail(make)));
        self
    }

    /// 已收到的全部调用
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_rules(&self) -> std::sync::MutexGuard<'_, Vec<(String, Reply)>> {
        self.rules.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        {
            let rules = self.lock_rules();
            let matched = rules.iter().find(|(needle, _)| {
                messages
                    .iter()
                    .any(|m| m.content.contains(needle.as_str()))
            });
            if let Some((_, reply)) = matched {
                return reply.resolve();
            }
        }

        match self.lock_queue().pop_front() {
            Some(reply) => reply.resolve(),
            None => Err(ModelError::Transport(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        self.next_reply(messages)
    }

    async fn invoke_structured<T>(&self, messages: &[ChatMessage]) -> Result<T, ModelError>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let text = self.next_reply(messages)?;
        serde_json::from_str(&text).map_err(|e| ModelError::InvalidResponse(e.to_string()))
    }
}
