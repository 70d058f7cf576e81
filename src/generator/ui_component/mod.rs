//! UI组件工作流
//!
//! extract_data → classify → (ui: choose_descriptor → suggest_followups →) generate
//!
//! 分类结果是封闭的[`ComponentKind`]，模型给出无法识别的答案时走`Ui`分支。

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::generator::graph::{CompiledGraph, END, GraphError, StateGraph};
use crate::generator::rechart::ChartComponent;
use crate::generator::runner::SessionState;
use crate::generator::types::SessionMemory;
use crate::llm::ChatModel;

mod nodes;

use nodes::{ChooseDescriptor, Classify, ExtractData, GenerateUiComponent, SuggestFollowUps};

pub const WORKFLOW: &str = "ui_component";

pub const EXTRACT_DATA: &str = "extract_data";
pub const CLASSIFY: &str = "classify";
pub const CHOOSE_DESCRIPTOR: &str = "choose_descriptor";
pub const SUGGEST_FOLLOWUPS: &str = "suggest_followups";
pub const GENERATE: &str = "generate";

/// 请求需要的组件类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Chart,
    #[default]
    Ui,
}

impl ComponentKind {
    /// 解析模型的分类答案，无法识别时返回`Ui`
    pub fn parse(answer: &str) -> Self {
        let normalized = answer
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
            .trim()
            .to_lowercase();
        match normalized.as_str() {
            "chart" => ComponentKind::Chart,
            _ => ComponentKind::Ui,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Chart => "chart",
            ComponentKind::Ui => "ui",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiComponentState {
    pub question: String,
    pub provided_data: String,
    pub dataset_name: Option<String>,
    pub extracted_data: String,
    pub component_kind: ComponentKind,
    /// 可选组件描述目录（JSON）
    pub component_descriptors: String,
    /// 选中的组件描述
    pub component_schema: String,
    pub follow_ups: Vec<String>,
    pub result: Option<ChartComponent>,
    pub memory: SessionMemory<ChartComponent>,
}

impl UiComponentState {
    pub fn new(
        question: impl Into<String>,
        provided_data: impl Into<String>,
        component_descriptors: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            provided_data: provided_data.into(),
            component_descriptors: component_descriptors.into(),
            ..Self::default()
        }
    }

    pub fn with_dataset_name(mut self, name: Option<String>) -> Self {
        self.dataset_name = name;
        self
    }
}

impl SessionState for UiComponentState {
    fn carry_forward(&mut self, previous: Option<Self>) {
        self.memory
            .resume(previous.map(|p| p.memory), &self.question);
    }
}

fn route_by_kind(state: &UiComponentState) -> &'static str {
    state.component_kind.label()
}

pub fn build_graph<M: ChatModel>(model: Arc<M>) -> Result<CompiledGraph<UiComponentState>, GraphError> {
    StateGraph::new(WORKFLOW)
        .add_node(EXTRACT_DATA, ExtractData::new(model.clone()))
        .add_node(CLASSIFY, Classify::new(model.clone()))
        .add_node(CHOOSE_DESCRIPTOR, ChooseDescriptor::new(model.clone()))
        .add_node(SUGGEST_FOLLOWUPS, SuggestFollowUps::new(model.clone()))
        .add_node(GENERATE, GenerateUiComponent::new(model))
        .set_entry_point(EXTRACT_DATA)
        .add_edge(EXTRACT_DATA, CLASSIFY)
        .add_conditional_edges(
            CLASSIFY,
            route_by_kind,
            &[("ui", CHOOSE_DESCRIPTOR), ("chart", GENERATE)],
        )
        .add_edge(CHOOSE_DESCRIPTOR, SUGGEST_FOLLOWUPS)
        .add_edge(SUGGEST_FOLLOWUPS, GENERATE)
        .add_edge(GENERATE, END)
        .compile()
}

#[cfg(test)]
mod tests;
