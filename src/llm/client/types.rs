use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 带角色的单条消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// 模型调用失败的可区分原因
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("LLM API key is not configured")]
    MissingApiKey,

    #[error("model service unreachable: {0}")]
    Transport(String),

    #[error("model response could not be parsed: {0}")]
    InvalidResponse(String),
}

/// 外部模型客户端契约
///
/// 工作流节点只依赖这个trait，生产环境由[`super::LLMClient`]实现，
/// 测试与离线运行使用[`crate::llm::ScriptedModel`]。
#[async_trait]
pub trait ChatModel: Send + Sync + 'static {
    /// 返回自由文本
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelError>;

    /// 返回按`T`的schema校验过的结构化对象
    async fn invoke_structured<T>(&self, messages: &[ChatMessage]) -> Result<T, ModelError>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static;
}
