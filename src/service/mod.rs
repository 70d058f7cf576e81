//! 用例层：校验请求、准备静态数据、驱动工作流并转换为接口响应

use thiserror::Error;
use uuid::Uuid;

use crate::generator::types::WorkflowError;
use crate::llm::ModelError;
use crate::storage::StorageError;

pub mod component;
pub mod dashboard;
pub mod page;

pub use component::{
    ComponentRequest, ComponentResponse, RechartRequest, RechartResponse, UiComponentRequest,
    UiComponentResponse, generate_component, generate_rechart, generate_ui_component,
};
pub use dashboard::{
    FinalRequest, FinalResponse, LayoutLink, LayoutRequest, LayoutResponse, generate_final,
    generate_layouts,
};
pub use page::{IframeRequest, IframeResponse, generate_iframe};

/// 面向调用方的错误
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("generation failed: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<WorkflowError> for ServiceError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Model {
                source: ModelError::MissingApiKey,
                ..
            } => ServiceError::Config(err.to_string()),
            WorkflowError::Model { .. } | WorkflowError::InvalidOutput { .. } => {
                ServiceError::Upstream(err.to_string())
            }
            WorkflowError::Checkpoint(_) | WorkflowError::State(_) | WorkflowError::Graph(_) => {
                ServiceError::Internal(err.to_string())
            }
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingConfig(_) => ServiceError::Config(err.to_string()),
            StorageError::Upload { .. } => ServiceError::Storage(err.to_string()),
        }
    }
}

/// 必填文本字段，空白视为缺失
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("`{}` must not be empty", field)));
    }
    Ok(trimmed)
}

/// 沿用调用方给出的会话标识，没有时生成新的
pub(crate) fn resolve_session(session_id: Option<String>) -> String {
    session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
