//! HTTP服务：路由、跨域、请求追踪与启动

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::llm::LLMClient;
use crate::storage::ArtifactUploader;

mod error;
pub mod handlers;

/// 组装全部路由
pub fn build_router(ctx: GeneratorContext) -> Router {
    let cors = cors_layer(&ctx.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/component/generate", post(handlers::generate_component))
        .route("/rechart/generate", post(handlers::generate_rechart))
        .route("/ui_component/generate", post(handlers::generate_ui_component))
        .route("/iframe/generate", post(handlers::generate_iframe))
        .route("/dashboard/generate-layouts", post(handlers::generate_layouts))
        .route("/dashboard/generate-final", post(handlers::generate_final))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ 忽略无效的跨域地址: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// 初始化日志，`RUST_LOG`优先
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "genui_rs=debug,tower_http=debug"
    } else {
        "genui_rs=info,tower_http=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 重复初始化时保留已有的subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 启动HTTP服务
pub async fn serve(config: Config) -> Result<()> {
    init_tracing(config.verbose);

    let llm_client = LLMClient::new(&config.llm).context(format!(
        "Failed to create LLM client for provider `{}`",
        config.llm.provider
    ))?;
    if let Err(e) = llm_client.check_connection().await {
        warn!("⚠️ 模型连接检查未通过，服务仍将启动: {}", e);
    }

    let missing = config.storage.missing_fields();
    if !missing.is_empty() {
        warn!(
            "⚠️ 对象存储配置不完整，上传将失败: {}",
            missing.join(", ")
        );
    }
    let uploader = ArtifactUploader::from_config(&config.storage);

    let address = config.bind_address();
    let ctx = GeneratorContext::new(config, Arc::new(llm_client), uploader)?;
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind {}", address))?;
    info!("🚀 服务已启动: http://{}", address);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
