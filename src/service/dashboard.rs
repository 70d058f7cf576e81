//! 仪表盘的两个阶段：生成候选布局、按选中布局定稿

use serde::{Deserialize, Serialize};
use tracing::info;

use super::page::data_or_default;
use super::{ServiceError, require_text, resolve_session};
use crate::artifact::package;
use crate::generator::context::GeneratorContext;
use crate::generator::dashboard::DashboardState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLink {
    pub url: String,
    #[serde(rename = "layoutId")]
    pub layout_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResponse {
    pub layouts: Vec<LayoutLink>,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinalRequest {
    #[serde(default, rename = "layoutId", alias = "layout_id")]
    pub layout_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub url: String,
    pub session_id: String,
}

/// 生成三个候选布局并逐个上传
pub async fn generate_layouts(
    ctx: &GeneratorContext,
    request: LayoutRequest,
) -> Result<LayoutResponse, ServiceError> {
    let query = require_text("query", &request.query)?.to_string();
    let session_id = resolve_session(request.session_id);
    info!("🚀 生成仪表盘布局，会话 {}", session_id);

    let state = DashboardState::layouts(
        query,
        data_or_default(ctx, request.data),
        ctx.assets.component_library_json(),
        ctx.assets.design_tokens.clone(),
    );
    let outcome = ctx.workflows.dashboard.run(&session_id, state).await?;

    let mut layouts = Vec::with_capacity(outcome.state.layouts.len());
    for layout in &outcome.state.layouts {
        let url = ctx.uploader.upload(&package(&layout.page())).await?;
        layouts.push(LayoutLink {
            url,
            layout_id: layout.layout_id.clone(),
        });
    }

    Ok(LayoutResponse {
        layouts,
        session_id,
    })
}

/// 按会话中最近一次的布局列表定稿
pub async fn generate_final(
    ctx: &GeneratorContext,
    request: FinalRequest,
) -> Result<FinalResponse, ServiceError> {
    let layout_id = require_text("layoutId", &request.layout_id)?.to_string();
    let session_id = request
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Validation("`session_id` is required".to_string()))?;

    let layout = ctx
        .workflows
        .dashboard
        .latest_state(&session_id)
        .await?
        .and_then(|state| state.find_layout(&layout_id).cloned())
        .ok_or_else(|| ServiceError::NotFound("layout not found".to_string()))?;
    info!("🚀 定稿仪表盘布局 {}，会话 {}", layout_id, session_id);

    let state = DashboardState::finalize(
        layout,
        ctx.assets.component_library_json(),
        ctx.assets.design_tokens.clone(),
    );
    let outcome = ctx.workflows.dashboard.run(&session_id, state).await?;
    let page = outcome
        .state
        .final_page
        .ok_or_else(|| ServiceError::Internal("dashboard workflow produced no page".into()))?;

    let url = ctx.uploader.upload(&package(&page)).await?;
    Ok(FinalResponse { url, session_id })
}
