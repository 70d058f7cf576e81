//! 生成并发布可嵌入的页面

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, require_text, resolve_session};
use crate::artifact::package;
use crate::generator::context::GeneratorContext;
use crate::generator::iframe::IframeState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IframeRequest {
    #[serde(default)]
    pub question: String,
    /// 为空时使用默认数据集
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IframeResponse {
    pub id: String,
    pub url: String,
    pub session_id: String,
}

/// 数据为空时回退到默认数据集
pub(crate) fn data_or_default(ctx: &GeneratorContext, data: Option<String>) -> String {
    data.filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| ctx.assets.dataset_json())
}

pub async fn generate_iframe(
    ctx: &GeneratorContext,
    request: IframeRequest,
) -> Result<IframeResponse, ServiceError> {
    let question = require_text("question", &request.question)?.to_string();
    let session_id = resolve_session(request.session_id);
    info!("🚀 生成iframe页面，会话 {}", session_id);

    let state = IframeState::new(
        question,
        data_or_default(ctx, request.data),
        ctx.assets.component_library_json(),
        ctx.assets.design_tokens.clone(),
    );
    let outcome = ctx.workflows.iframe.run(&session_id, state).await?;
    let page = outcome
        .state
        .result
        .ok_or_else(|| ServiceError::Internal("iframe workflow produced no page".into()))?;

    let url = ctx.uploader.upload(&package(&page)).await?;
    Ok(IframeResponse {
        id: Uuid::new_v4().to_string(),
        url,
        session_id,
    })
}
