//! 组件工作流：analyze_data → component_plan → generate
//!
//! 用内置的组件描述目录把数据填进预设组件，最终产出一个React组件。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::generator::graph::{CompiledGraph, END, GraphError, StateGraph};
use crate::generator::runner::SessionState;
use crate::generator::types::SessionMemory;
use crate::llm::ChatModel;

mod nodes;

use nodes::{AnalyzeData, ComponentPlan, GenerateComponent};

pub const WORKFLOW: &str = "component";

pub const ANALYZE_DATA: &str = "analyze_data";
pub const COMPONENT_PLAN: &str = "component_plan";
pub const GENERATE: &str = "generate";

/// 预设UI组件的描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(rename = "htmlTags")]
    pub html_tags: Vec<String>,
    pub style: String,
}

/// 生成的React组件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentArtifact {
    /// 组件名
    #[serde(default)]
    pub name: String,
    /// 组件源码，以`export default <Name>`结尾
    #[serde(default)]
    pub component: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentState {
    pub question: String,
    pub data: String,
    pub catalog: Vec<ComponentDescriptor>,
    pub analyzed_data: String,
    pub component_plan: String,
    pub result: Option<ComponentArtifact>,
    pub memory: SessionMemory<ComponentArtifact>,
}

impl ComponentState {
    pub fn new(question: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            data: data.into(),
            catalog: default_catalog(),
            ..Self::default()
        }
    }
}

impl SessionState for ComponentState {
    fn carry_forward(&mut self, previous: Option<Self>) {
        self.memory
            .resume(previous.map(|p| p.memory), &self.question);
    }
}

pub fn build_graph<M: ChatModel>(model: Arc<M>) -> Result<CompiledGraph<ComponentState>, GraphError> {
    StateGraph::new(WORKFLOW)
        .add_node(ANALYZE_DATA, AnalyzeData::new(model.clone()))
        .add_node(COMPONENT_PLAN, ComponentPlan::new(model.clone()))
        .add_node(GENERATE, GenerateComponent::new(model))
        .set_entry_point(ANALYZE_DATA)
        .add_edge(ANALYZE_DATA, COMPONENT_PLAN)
        .add_edge(COMPONENT_PLAN, GENERATE)
        .add_edge(GENERATE, END)
        .compile()
}

fn descriptor(kind: &str, description: &str, html_tags: &[&str], style: &str) -> ComponentDescriptor {
    ComponentDescriptor {
        kind: kind.to_string(),
        description: description.to_string(),
        html_tags: html_tags.iter().map(|t| t.to_string()).collect(),
        style: style.to_string(),
    }
}

/// 内置的组件描述目录
pub fn default_catalog() -> Vec<ComponentDescriptor> {
    vec![
        descriptor(
            "Card",
            "A card for displaying a handful of important details.",
            &["h1", "h2", "p", "span", "ul", "li"],
            "w-full max-w-[281px] h-36 flex flex-col items-start p-4 gap-1 bg-white border border-[#99C1C1] backdrop-blur-[100px] rounded-2xl box-border",
        ),
        descriptor(
            "MetricBox",
            "A box showing a key metric with its percentage change and trend indicator.",
            &["div", "span", "p", "h3", "svg"],
            "w-full max-w-[300px] p-4 bg-card-light rounded-lg border border-gray-200 shadow-sm flex flex-col gap-2",
        ),
        descriptor(
            "AlertBox",
            "A prominent alert for critical information, warnings or abnormal values.",
            &["div", "p", "span", "svg", "button"],
            "w-full p-4 bg-red-50 border border-red-200 rounded-lg flex items-start gap-3",
        ),
        descriptor(
            "TimelineCard",
            "A chronological timeline of events, results or milestones.",
            &["div", "ul", "li", "span", "p", "time"],
            "w-full max-w-[400px] p-4 bg-card-medium rounded-lg border border-gray-200",
        ),
        descriptor(
            "ComparisonBox",
            "A side by side comparison of two sets of values, such as before and after.",
            &["div", "table", "tr", "td", "th", "span"],
            "w-full max-w-[500px] p-4 bg-card-dark rounded-lg border border-gray-200",
        ),
        descriptor(
            "StatusIndicator",
            "A compact status badge with a visual indicator for quick overviews.",
            &["div", "span", "p", "svg"],
            "w-full max-w-[200px] p-3 bg-card-light rounded-lg border border-gray-200 flex items-center gap-2",
        ),
    ]
}
