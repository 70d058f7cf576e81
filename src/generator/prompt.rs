//! Prompt模板与节点调用模型的公共逻辑

use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::generator::types::WorkflowError;
use crate::llm::{ChatMessage, ChatModel};

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
}

/// 插入到用户提示词中的一段资料
#[derive(Debug, Clone)]
pub struct PromptSection {
    pub title: &'static str,
    pub body: String,
}

impl PromptSection {
    pub fn new(title: &'static str, body: impl Into<String>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }

    /// 以格式化JSON呈现
    pub fn json<T: Serialize>(title: &'static str, value: &T) -> Self {
        Self::new(
            title,
            serde_json::to_string_pretty(value).unwrap_or_default(),
        )
    }

    /// 此前的提问，没有时返回None
    pub fn history<'a>(questions: impl Iterator<Item = &'a str>) -> Option<Self> {
        let lines: Vec<String> = questions
            .enumerate()
            .map(|(i, q)| format!("{}. {}", i + 1, q))
            .collect();
        (!lines.is_empty()).then(|| Self::new("Earlier requests in this session", lines.join("\n")))
    }
}

impl PromptTemplate {
    pub fn new(
        system_prompt: impl Into<String>,
        opening_instruction: impl Into<String>,
        closing_instruction: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            opening_instruction: opening_instruction.into(),
            closing_instruction: closing_instruction.into(),
        }
    }

    /// 组装为系统消息与用户消息，空白资料段会被跳过
    pub fn build(&self, sections: impl IntoIterator<Item = PromptSection>) -> Vec<ChatMessage> {
        let mut user = String::new();
        if !self.opening_instruction.is_empty() {
            user.push_str(&self.opening_instruction);
            user.push_str("\n\n");
        }
        for section in sections {
            if section.body.trim().is_empty() {
                continue;
            }
            user.push_str(&format!("### {}\n{}\n\n", section.title, section.body));
        }
        user.push_str(&self.closing_instruction);

        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(user.trim_end().to_string()),
        ]
    }
}

/// 调用模型返回文本
pub async fn ask_text<M: ChatModel>(
    model: &M,
    node: &'static str,
    messages: &[ChatMessage],
) -> Result<String, WorkflowError> {
    debug!("💬 节点 {} 请求文本输出", node);
    model
        .invoke(messages)
        .await
        .map_err(|e| WorkflowError::model(node, e))
}

/// 调用模型返回结构化结果
pub async fn ask_structured<M, T>(
    model: &M,
    node: &'static str,
    messages: &[ChatMessage],
) -> Result<T, WorkflowError>
where
    M: ChatModel,
    T: JsonSchema + DeserializeOwned + Serialize + Send + Sync + 'static,
{
    debug!("💬 节点 {} 请求结构化输出", node);
    model
        .invoke_structured::<T>(messages)
        .await
        .map_err(|e| WorkflowError::model(node, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatRole;

    #[test]
    fn test_build_skips_blank_sections() {
        let template = PromptTemplate::new("sys", "Begin.", "End.");
        let messages = template.build([
            PromptSection::new("Question", "show revenue"),
            PromptSection::new("Empty", "   "),
            PromptSection::new("Data", "[1,2]"),
        ]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(
            messages[1].content,
            "Begin.\n\n### Question\nshow revenue\n\n### Data\n[1,2]\n\nEnd."
        );
    }

    #[test]
    fn test_history_section() {
        assert!(PromptSection::history(std::iter::empty()).is_none());

        let section = PromptSection::history(["a", "b"].into_iter()).unwrap();
        assert_eq!(section.body, "1. a\n2. b");
    }
}
