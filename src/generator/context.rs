use std::sync::Arc;

use anyhow::Result;

use crate::{
    assets::StaticAssets,
    checkpoint::{CheckpointStore, build_store},
    config::Config,
    generator::{
        component, dashboard, iframe, rechart,
        runner::WorkflowRunner,
        ui_component,
    },
    llm::ChatModel,
    storage::ArtifactUploader,
};

/// 各用例的工作流运行器，启动时编译一次
pub struct Workflows {
    pub component: WorkflowRunner<component::ComponentState>,
    pub rechart: WorkflowRunner<rechart::RechartState>,
    pub ui_component: WorkflowRunner<ui_component::UiComponentState>,
    pub iframe: WorkflowRunner<iframe::IframeState>,
    pub dashboard: WorkflowRunner<dashboard::DashboardState>,
}

#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Config,
    /// 静态参考数据
    pub assets: Arc<StaticAssets>,
    /// 产物上传器
    pub uploader: ArtifactUploader,
    /// 编译好的工作流
    pub workflows: Arc<Workflows>,
}

impl GeneratorContext {
    /// 创建新的生成器上下文，检查点存储按配置创建
    pub fn new<M: ChatModel>(config: Config, llm_client: Arc<M>, uploader: ArtifactUploader) -> Result<Self> {
        let checkpoints = build_store(&config.checkpoint);
        let assets = Arc::new(StaticAssets::load(&config.assets));
        Self::with_parts(config, llm_client, uploader, checkpoints, assets)
    }

    /// 使用给定的检查点存储与静态数据创建上下文
    pub fn with_parts<M: ChatModel>(
        config: Config,
        llm_client: Arc<M>,
        uploader: ArtifactUploader,
        checkpoints: Arc<dyn CheckpointStore>,
        assets: Arc<StaticAssets>,
    ) -> Result<Self> {
        let policy = config.checkpoint.commit;
        let workflows = Workflows {
            component: WorkflowRunner::new(
                component::build_graph(llm_client.clone())?,
                checkpoints.clone(),
                policy,
            ),
            rechart: WorkflowRunner::new(
                rechart::build_graph(llm_client.clone())?,
                checkpoints.clone(),
                policy,
            ),
            ui_component: WorkflowRunner::new(
                ui_component::build_graph(llm_client.clone())?,
                checkpoints.clone(),
                policy,
            ),
            iframe: WorkflowRunner::new(
                iframe::build_graph(llm_client.clone())?,
                checkpoints.clone(),
                policy,
            ),
            dashboard: WorkflowRunner::new(dashboard::build_graph(llm_client)?, checkpoints, policy),
        };

        Ok(Self {
            config,
            assets,
            uploader,
            workflows: Arc::new(workflows),
        })
    }
}
