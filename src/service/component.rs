//! 直接返回组件代码的用例：component、rechart、ui_component

use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, require_text, resolve_session};
use crate::generator::component::ComponentState;
use crate::generator::context::GeneratorContext;
use crate::generator::rechart::RechartState;
use crate::generator::ui_component::UiComponentState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentResponse {
    pub name: String,
    pub component: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RechartRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechartResponse {
    pub name: String,
    pub component: String,
    #[serde(rename = "rechartComponents")]
    pub rechart_components: Vec<String>,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiComponentRequest {
    #[serde(default)]
    pub prompt: String,
    /// base64编码的数据集
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiComponentResponse {
    pub id: String,
    pub name: String,
    pub component: String,
    #[serde(rename = "rechartComponents")]
    pub rechart_components: Vec<String>,
    #[serde(rename = "followUps")]
    pub follow_ups: Vec<String>,
    pub session_id: String,
}

/// 用内置组件目录生成React组件
pub async fn generate_component(
    ctx: &GeneratorContext,
    request: ComponentRequest,
) -> Result<ComponentResponse, ServiceError> {
    let prompt = require_text("prompt", &request.prompt)?.to_string();
    let session_id = resolve_session(request.session_id);
    info!("🚀 生成组件，会话 {}", session_id);

    let state = ComponentState::new(prompt, ctx.assets.dataset_json());
    let outcome = ctx.workflows.component.run(&session_id, state).await?;
    let artifact = outcome
        .state
        .result
        .ok_or_else(|| ServiceError::Internal("component workflow produced no result".into()))?;

    Ok(ComponentResponse {
        name: artifact.name,
        component: artifact.component,
        session_id,
    })
}

/// 基于默认数据集生成Recharts图表组件
pub async fn generate_rechart(
    ctx: &GeneratorContext,
    request: RechartRequest,
) -> Result<RechartResponse, ServiceError> {
    let prompt = require_text("prompt", &request.prompt)?.to_string();
    let session_id = resolve_session(request.session_id);
    info!("🚀 生成图表组件，会话 {}", session_id);

    let state = RechartState::new(prompt, ctx.assets.dataset_json());
    let outcome = ctx.workflows.rechart.run(&session_id, state).await?;
    let chart = outcome
        .state
        .result
        .ok_or_else(|| ServiceError::Internal("rechart workflow produced no result".into()))?;

    Ok(RechartResponse {
        name: chart.name,
        component: chart.component,
        rechart_components: chart.rechart_components,
        session_id,
    })
}

/// 解码base64数据集
fn decode_dataset(encoded: &str) -> Result<String, ServiceError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::Validation(format!("Failed to decode dataset: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ServiceError::Validation(format!("Dataset is not valid UTF-8: {}", e)))
}

/// 根据提问与数据集生成图表或UI组件
pub async fn generate_ui_component(
    ctx: &GeneratorContext,
    request: UiComponentRequest,
) -> Result<UiComponentResponse, ServiceError> {
    let prompt = require_text("prompt", &request.prompt)?.to_string();

    let (data, dataset_name) = match request.dataset.as_deref() {
        Some(encoded) if !encoded.trim().is_empty() => {
            (decode_dataset(encoded)?, request.dataset_name.clone())
        }
        _ => (ctx.assets.dataset_json(), None),
    };
    let session_id = resolve_session(request.session_id);
    info!("🚀 生成UI组件，会话 {}", session_id);

    let state = UiComponentState::new(prompt, data, ctx.assets.component_library_json())
        .with_dataset_name(dataset_name);
    let outcome = ctx.workflows.ui_component.run(&session_id, state).await?;
    let follow_ups = outcome.state.follow_ups;
    let component = outcome
        .state
        .result
        .ok_or_else(|| ServiceError::Internal("ui_component workflow produced no result".into()))?;

    Ok(UiComponentResponse {
        id: Uuid::new_v4().to_string(),
        name: component.name,
        component: component.component,
        rechart_components: component.rechart_components,
        follow_ups,
        session_id,
    })
}
