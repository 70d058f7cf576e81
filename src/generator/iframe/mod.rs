//! 可嵌入iframe的页面工作流：单个结构化节点生成{标题, html, css, js}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::artifact::PageFiles;
use crate::generator::graph::{CompiledGraph, END, GraphError, Node, StateGraph};
use crate::generator::prompt::{PromptSection, PromptTemplate, ask_structured};
use crate::generator::runner::SessionState;
use crate::generator::types::{SessionMemory, WorkflowError};
use crate::llm::ChatModel;

pub const WORKFLOW: &str = "iframe";

pub const GENERATE_COMPONENTS: &str = "generate_components";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IframeState {
    pub question: String,
    pub data: String,
    /// UI组件描述目录
    pub ui_descriptor: String,
    /// 设计系统CSS
    pub css_descriptor: String,
    pub result: Option<PageFiles>,
    pub memory: SessionMemory<PageFiles>,
}

impl IframeState {
    pub fn new(
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
}

impl SessionState for IframeState {
    fn carry_forward(&mut self, previous: Option<Self>) {
        self.memory
            .resume(previous.map(|p| p.memory), &self.question);
    }
}

/// 上一版页面，供模型在其基础上修改
fn previous_page_section(page: &PageFiles) -> PromptSection {
    PromptSection::new(
        "Previous page",
        format!(
            "Title: {}\n\nHTML:\n{}\n\nCSS:\n{}\n\nJS:\n{}",
            page.page_title, page.html, page.css, page.js
        ),
    )
}

struct GenerateComponents<M> {
    model: Arc<M>,
}

#[async_trait]
impl<M: ChatModel> Node<IframeState> for GenerateComponents<M> {
    async fn run(&self, mut state: IframeState) -> Result<IframeState, WorkflowError> {
        let template = PromptTemplate::new(
            "You are an expert web developer creating interactive components that are embedded in sandboxed iframes. \
             Generate a complete, self-contained component as separate HTML, CSS and JavaScript.\n\
             - The HTML is only the content of <body>; do not include <html>, <head> or <body> tags\n\
             - The page loads ./styles.css and ./app.js itself; do not add <link> or <script> tags\n\
             - Read input data from `window.componentData` and handle missing data gracefully\n\
             - Expose `window.initializeComponent(id)`, which is called once the DOM is loaded\n\
             - Use the provided design system classes and component descriptors\n\
             - Keep the component responsive, accessible and free of external dependencies",
            "Generate a professional web component based on the following requirements.",
            "Respond with page_title, html, css and js.",
        );
        let messages = template.build(
            [
                Some(PromptSection::new("User's prompt", state.question.clone())),
                PromptSection::history(state.memory.earlier_questions()),
                Some(PromptSection::new("Provided data", state.data.clone())),
                Some(PromptSection::new("UI component descriptors", state.ui_descriptor.clone())),
                Some(PromptSection::new("Design system CSS", state.css_descriptor.clone())),
                state.memory.artifacts.last().map(previous_page_section),
            ]
            .into_iter()
            .flatten(),
        );

        let page: PageFiles =
            ask_structured(self.model.as_ref(), GENERATE_COMPONENTS, &messages).await?;
        if page.html.trim().is_empty() {
            return Err(WorkflowError::invalid(GENERATE_COMPONENTS, "empty html"));
        }

        state.memory.record(page.clone());
        state.result = Some(page);
        Ok(state)
    }
}

pub fn build_graph<M: ChatModel>(model: Arc<M>) -> Result<CompiledGraph<IframeState>, GraphError> {
    StateGraph::new(WORKFLOW)
        .add_node(GENERATE_COMPONENTS, GenerateComponents { model })
        .set_entry_point(GENERATE_COMPONENTS)
        .add_edge(GENERATE_COMPONENTS, END)
        .compile()
}
