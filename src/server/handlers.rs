use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::generator::context::GeneratorContext;
use crate::service::{
    self, ComponentRequest, ComponentResponse, FinalRequest, FinalResponse, IframeRequest,
    IframeResponse, LayoutRequest, LayoutResponse, RechartRequest, RechartResponse,
    ServiceError, UiComponentRequest, UiComponentResponse,
};

type ApiResult<T> = Result<Json<T>, ServiceError>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate_component(
    State(ctx): State<GeneratorContext>,
    Json(request): Json<ComponentRequest>,
) -> ApiResult<ComponentResponse> {
    service::generate_component(&ctx, request).await.map(Json)
}

pub async fn generate_rechart(
    State(ctx): State<GeneratorContext>,
    Json(request): Json<RechartRequest>,
) -> ApiResult<RechartResponse> {
    service::generate_rechart(&ctx, request).await.map(Json)
}

pub async fn generate_ui_component(
    State(ctx): State<GeneratorContext>,
    Json(request): Json<UiComponentRequest>,
) -> ApiResult<UiComponentResponse> {
    service::generate_ui_component(&ctx, request).await.map(Json)
}

pub async fn generate_iframe(
    State(ctx): State<GeneratorContext>,
    Json(request): Json<IframeRequest>,
) -> ApiResult<IframeResponse> {
    service::generate_iframe(&ctx, request).await.map(Json)
}

pub async fn generate_layouts(
    State(ctx): State<GeneratorContext>,
    Json(request): Json<LayoutRequest>,
) -> ApiResult<LayoutResponse> {
    service::generate_layouts(&ctx, request).await.map(Json)
}

pub async fn generate_final(
    State(ctx): State<GeneratorContext>,
    Json(request): Json<FinalRequest>,
) -> ApiResult<FinalResponse> {
    service::generate_final(&ctx, request).await.map(Json)
}
