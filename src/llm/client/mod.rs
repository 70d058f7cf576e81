//! LLM客户端 - 提供统一的LLM服务接口

use async_trait::async_trait;
use rig::extractor::ExtractionError;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    config::LLMConfig,
    llm::client::utils::{Conversation, evaluate_befitting_model},
    utils::retry::{RetryPolicy, retry_with_backoff},
};

mod providers;
pub mod types;
pub mod utils;

use providers::ProviderClient;
use types::{ChatMessage, ChatModel, ModelError};

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端，缺少API KEY时立即失败
    pub fn new(config: &LLMConfig) -> Result<Self, ModelError> {
        if config.provider.requires_api_key() && config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey);
        }
        let client =
            ProviderClient::new(config).map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<(), ModelError> {
        info!("🔄 正在检查模型连接...");
        let messages = [
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("Hello"),
        ];
        match self.invoke(&messages).await {
            Ok(_) => {
                info!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                warn!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.retry_attempts, self.config.retry_delay_ms)
    }

    /// 单次调用加上传输超时
    async fn with_timeout<T, Fut>(&self, fut: Fut) -> Result<T, ModelError>
    where
        Fut: Future<Output = Result<T, ModelError>>,
    {
        let limit = Duration::from_secs(self.config.timeout_seconds.max(1));
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Transport(format!(
                "timed out after {}s",
                limit.as_secs()
            ))),
        }
    }

    async fn invoke_inner(
        &self,
        conversation: &Conversation,
        model: String,
        fallover_model: Option<String>,
    ) -> Result<String, ModelError> {
        let agent = self
            .client
            .create_agent(&model, &conversation.preamble, &self.config);

        let result = retry_with_backoff(self.retry_policy(), "调用模型服务", || async {
            self.with_timeout(async {
                agent
                    .chat(&conversation.prompt, conversation.history.clone())
                    .await
                    .map_err(|e| ModelError::Transport(e.to_string()))
            })
            .await
        })
        .await;

        match (result, fallover_model) {
            (Err(e), Some(fallover)) => {
                warn!(
                    "❌ 调用模型{}均失败，尝试使用备选模型{}...{}",
                    model, fallover, e
                );
                Box::pin(self.invoke_inner(conversation, fallover, None)).await
            }
            (result, _) => result,
        }
    }

    async fn extract_inner<T>(
        &self,
        conversation: &Conversation,
        model: String,
        fallover_model: Option<String>,
    ) -> Result<T, ModelError>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let extractor =
            self.client
                .create_extractor::<T>(&model, &conversation.preamble, &self.config);

        let result = retry_with_backoff(self.retry_policy(), "调用模型服务", || async {
            self.with_timeout(async {
                extractor
                    .extract(&conversation.prompt, conversation.history.clone())
                    .await
                    .map_err(classify_extraction_error)
            })
            .await
        })
        .await;

        match (result, fallover_model) {
            (Err(e), Some(fallover)) => {
                warn!(
                    "❌ 调用模型{}均失败，尝试使用备选模型{}...{}",
                    model, fallover, e
                );
                Box::pin(self.extract_inner(conversation, fallover, None)).await
            }
            (result, _) => result,
        }
    }
}

fn classify_extraction_error(err: ExtractionError) -> ModelError {
    match err {
        ExtractionError::NoData => ModelError::InvalidResponse("no data extracted".to_string()),
        ExtractionError::DeserializationError(e) => ModelError::InvalidResponse(e.to_string()),
        other => ModelError::Transport(other.to_string()),
    }
}

#[async_trait]
impl ChatModel for LLMClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        let conversation = Conversation::from_messages(messages);
        let (model, fallover) =
            evaluate_befitting_model(&self.config, &conversation.preamble, &conversation.prompt);
        debug!(
            "🤖 {} 文本调用，约 {} tokens",
            model,
            conversation.estimated_tokens()
        );
        self.invoke_inner(&conversation, model, fallover).await
    }

    async fn invoke_structured<T>(&self, messages: &[ChatMessage]) -> Result<T, ModelError>
    where
        T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let conversation = Conversation::from_messages(messages);
        let (model, fallover) =
            evaluate_befitting_model(&self.config, &conversation.preamble, &conversation.prompt);
        debug!(
            "🤖 {} 结构化调用，约 {} tokens",
            model,
            conversation.estimated_tokens()
        );
        self.extract_inner(&conversation, model, fallover).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LLMProvider;

    #[test]
    fn test_missing_api_key_fails_fast() {
        let config = LLMConfig {
            provider: LLMProvider::OpenAI,
            api_key: "   ".to_string(),
            ..LLMConfig::default()
        };

        assert!(matches!(
            LLMClient::new(&config),
            Err(ModelError::MissingApiKey)
        ));
    }

    #[test]
    fn test_client_builds_with_key() {
        let config = LLMConfig {
            provider: LLMProvider::OpenAI,
            api_key: "sk-test".to_string(),
            ..LLMConfig::default()
        };

        assert!(LLMClient::new(&config).is_ok());
    }

    #[test]
    fn test_extraction_errors_are_classified() {
        assert!(matches!(
            classify_extraction_error(ExtractionError::NoData),
            ModelError::InvalidResponse(_)
        ));

        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            classify_extraction_error(ExtractionError::DeserializationError(serde_err)),
            ModelError::InvalidResponse(_)
        ));
    }
}
