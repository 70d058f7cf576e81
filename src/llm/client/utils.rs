use rig::completion::Message;

use crate::{
    config::LLMConfig,
    llm::client::types::{ChatMessage, ChatRole},
    utils::token_estimator::TokenEstimator,
};

use std::sync::LazyLock;

static TOKEN_ESTIMATOR: LazyLock<TokenEstimator> = LazyLock::new(TokenEstimator::new);

/// 按prompt体量选择模型，返回(首选模型, 兜底模型)
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> (String, Option<String>) {
    if system_prompt.len() + user_prompt.len() <= 32 * 1024 {
        let fallover = (llm_config.model_powerful != llm_config.model_efficient)
            .then(|| llm_config.model_powerful.clone());
        return (llm_config.model_efficient.clone(), fallover);
    }
    (llm_config.model_powerful.clone(), None)
}

/// 拆分后的对话：系统提示词、当前提问、此前的对话轮次
pub struct Conversation {
    pub preamble: String,
    pub prompt: String,
    pub history: Vec<Message>,
}

impl Conversation {
    /// 系统消息合并为preamble，最后一条非系统消息作为本轮提问，其余进入历史
    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        let preamble = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut turns: Vec<&ChatMessage> = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .collect();
        let prompt = turns.pop().map(|m| m.content.clone()).unwrap_or_default();

        let history = turns
            .into_iter()
            .map(|m| match m.role {
                ChatRole::Assistant => Message::assistant(m.content.clone()),
                _ => Message::user(m.content.clone()),
            })
            .collect();

        Self {
            preamble,
            prompt,
            history,
        }
    }

    pub fn estimated_tokens(&self) -> usize {
        TOKEN_ESTIMATOR.estimate_all([self.preamble.as_str(), self.prompt.as_str()])
    }
}
