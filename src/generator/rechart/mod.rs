//! Recharts图表工作流：单个结构化节点

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::generator::graph::{CompiledGraph, END, GraphError, Node, StateGraph};
use crate::generator::prompt::{PromptSection, PromptTemplate, ask_structured};
use crate::generator::runner::SessionState;
use crate::generator::types::WorkflowError;
use crate::llm::ChatModel;

pub const WORKFLOW: &str = "rechart";

pub const GENERATE: &str = "generate";

/// 内联的图表/UI组件代码
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartComponent {
    /// 组件名
    #[serde(default)]
    pub name: String,
    /// 组件源码
    #[serde(default)]
    pub component: String,
    /// 用到的Recharts组件
    #[serde(default, rename = "rechartComponents")]
    pub rechart_components: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RechartState {
    pub question: String,
    pub data: String,
    pub result: Option<ChartComponent>,
}

impl RechartState {
    pub fn new(question: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            data: data.into(),
            result: None,
        }
    }
}

impl SessionState for RechartState {
    // 单次生成，不保留会话记忆
    const PERSIST: bool = false;

    fn carry_forward(&mut self, _previous: Option<Self>) {}
}

pub(crate) fn recharts_template() -> PromptTemplate {
    PromptTemplate::new(
        "You are a helpful assistant that generates a React component using the Recharts library based on the provided data and the user's request.\n\
         1. Use the Recharts library components\n\
         2. Wrap the chart in a ResponsiveContainer so it stays responsive\n\
         3. Define the \"data\" variable at the beginning of the component\n\
         4. Create a complete React component that visualizes the data according to the request\n\
         5. The component must end with the \"export default [componentName]\" statement\n\
         6. Return clean, well-structured React code and list every Recharts component it uses",
        "Using the data below, build the requested chart.",
        "Respond with the component name, its code and the Recharts components used.",
    )
}

struct GenerateChart<M> {
    model: Arc<M>,
}

#[async_trait]
impl<M: ChatModel> Node<RechartState> for GenerateChart<M> {
    async fn run(&self, mut state: RechartState) -> Result<RechartState, WorkflowError> {
        let messages = recharts_template().build([
            PromptSection::new("Request", state.question.clone()),
            PromptSection::new("Data", state.data.clone()),
        ]);
        let chart: ChartComponent =
            ask_structured(self.model.as_ref(), GENERATE, &messages).await?;
        if chart.component.trim().is_empty() {
            return Err(WorkflowError::invalid(GENERATE, "empty component code"));
        }
        state.result = Some(chart);
        Ok(state)
    }
}

pub fn build_graph<M: ChatModel>(model: Arc<M>) -> Result<CompiledGraph<RechartState>, GraphError> {
    StateGraph::new(WORKFLOW)
        .add_node(GENERATE, GenerateChart { model })
        .set_entry_point(GENERATE)
        .add_edge(GENERATE, END)
        .compile()
}
