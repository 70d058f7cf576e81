pub mod client;
pub mod scripted;

pub use client::LLMClient;
pub use client::types::{ChatMessage, ChatModel, ChatRole, ModelError};
pub use scripted::ScriptedModel;
