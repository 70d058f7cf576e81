//! 仪表盘工作流：先生成三个候选布局，再按选中的布局生成最终页面
//!
//! route_phase → (layout: generate_layouts | final: finalize_dashboard)

use futures::FutureExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::artifact::PageFiles;
use crate::generator::graph::{CompiledGraph, END, FnNode, GraphError, StateGraph};
use crate::generator::runner::SessionState;
use crate::generator::types::{SessionMemory, WorkflowError};
use crate::llm::ChatModel;

mod nodes;

use nodes::{FinalizeDashboard, GenerateLayouts};

pub const WORKFLOW: &str = "dashboard";

pub const ROUTE_PHASE: &str = "route_phase";
pub const GENERATE_LAYOUTS: &str = "generate_layouts";
pub const FINALIZE_DASHBOARD: &str = "finalize_dashboard";

/// 每次布局阶段必须产出的布局数量
pub const LAYOUT_COUNT: usize = 3;

/// 调用方指定的阶段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPhase {
    #[default]
    Layout,
    Final,
}

impl DashboardPhase {
    pub fn label(&self) -> &'static str {
        match self {
            DashboardPhase::Layout => "layout",
            DashboardPhase::Final => "final",
        }
    }
}

/// 一个候选布局
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Layout {
    /// 布局唯一标识
    #[serde(default)]
    pub layout_id: String,
    #[serde(default)]
    pub layout_name: String,
    /// 布局思路的简短说明
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
}

impl Layout {
    pub fn page(&self) -> PageFiles {
        PageFiles {
            page_title: self.page_title.clone(),
            html: self.html.clone(),
            css: self.css.clone(),
            js: self.js.clone(),
        }
    }
}

/// 布局阶段的结构化输出
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LayoutSet {
    /// 三个思路不同的布局
    #[serde(default)]
    pub layouts: Vec<Layout>,
}

impl LayoutSet {
    /// 校验数量，并在标识为空或重复时统一重编号
    pub fn into_distinct(self) -> Result<Vec<Layout>, WorkflowError> {
        let mut layouts = self.layouts;
        if layouts.len() != LAYOUT_COUNT {
            return Err(WorkflowError::invalid(
                GENERATE_LAYOUTS,
                format!("expected {} layouts, got {}", LAYOUT_COUNT, layouts.len()),
            ));
        }

        let mut seen = HashSet::new();
        let distinct = layouts
            .iter()
            .all(|l| !l.layout_id.trim().is_empty() && seen.insert(l.layout_id.trim().to_string()));
        if !distinct {
            for (i, layout) in layouts.iter_mut().enumerate() {
                layout.layout_id = format!("layout-{}", i + 1);
            }
        }
        Ok(layouts)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardState {
    pub question: String,
    pub data: String,
    pub ui_descriptor: String,
    pub css_descriptor: String,
    pub phase: DashboardPhase,
    pub selected_layout_id: Option<String>,
    pub selected_layout: Option<Layout>,
    /// 最近一次布局阶段的结果
    pub layouts: Vec<Layout>,
    pub final_page: Option<PageFiles>,
    pub memory: SessionMemory<PageFiles>,
}

impl DashboardState {
    /// 布局阶段的初始状态
    pub fn layouts(
        question: impl Into<String>,
        data: impl Into<String>,
        ui_descriptor: impl Into<String>,
        css_descriptor: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            data: data.into(),
            ui_descriptor: ui_descriptor.into(),
            css_descriptor: css_descriptor.into(),
            ..Self::default()
        }
    }

    /// 定稿阶段的初始状态，其余字段从会话快照补全
    pub fn finalize(
        layout: Layout,
        ui_descriptor: impl Into<String>,
        css_descriptor: impl Into<String>,
    ) -> Self {
        Self {
            phase: DashboardPhase::Final,
            selected_layout_id: Some(layout.layout_id.clone()),
            selected_layout: Some(layout),
            ui_descriptor: ui_descriptor.into(),
            css_descriptor: css_descriptor.into(),
            ..Self::default()
        }
    }

    pub fn find_layout(&self, layout_id: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.layout_id == layout_id)
    }
}

impl SessionState for DashboardState {
    fn carry_forward(&mut self, previous: Option<Self>) {
        match self.phase {
            DashboardPhase::Layout => {
                self.memory
                    .resume(previous.map(|p| p.memory), &self.question);
            }
            DashboardPhase::Final => {
                if let Some(previous) = previous {
                    if self.question.is_empty() {
                        self.question = previous.question;
                    }
                    if self.data.is_empty() {
                        self.data = previous.data;
                    }
                    if self.layouts.is_empty() {
                        self.layouts = previous.layouts;
                    }
                    self.memory = previous.memory;
                }
            }
        }
    }
}

fn route_by_phase(state: &DashboardState) -> &'static str {
    state.phase.label()
}

pub fn build_graph<M: ChatModel>(model: Arc<M>) -> Result<CompiledGraph<DashboardState>, GraphError> {
    StateGraph::new(WORKFLOW)
        .add_node(
            ROUTE_PHASE,
            FnNode(|state: DashboardState| async move { Ok::<_, WorkflowError>(state) }.boxed()),
        )
        .add_node(GENERATE_LAYOUTS, GenerateLayouts::new(model.clone()))
        .add_node(FINALIZE_DASHBOARD, FinalizeDashboard::new(model))
        .set_entry_point(ROUTE_PHASE)
        .add_conditional_edges(
            ROUTE_PHASE,
            route_by_phase,
            &[("layout", GENERATE_LAYOUTS), ("final", FINALIZE_DASHBOARD)],
        )
        .add_edge(GENERATE_LAYOUTS, END)
        .add_edge(FINALIZE_DASHBOARD, END)
        .compile()
}

#[cfg(test)]
mod tests;
