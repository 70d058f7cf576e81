use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{DashboardState, FINALIZE_DASHBOARD, GENERATE_LAYOUTS, LAYOUT_COUNT, Layout, LayoutSet};
use crate::artifact::PageFiles;
use crate::generator::graph::Node;
use crate::generator::prompt::{PromptSection, PromptTemplate, ask_structured};
use crate::generator::types::WorkflowError;
use crate::llm::ChatModel;

/// 会话中此前生成过的页面，只列标题
fn earlier_pages_section(pages: &[PageFiles]) -> Option<PromptSection> {
    if pages.is_empty() {
        return None;
    }
    let titles = pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{}. {}", i + 1, page.page_title))
        .collect::<Vec<_>>()
        .join("\n");
    Some(PromptSection::new("Earlier pages", titles))
}

pub struct GenerateLayouts<M> {
    model: Arc<M>,
}

impl<M> GenerateLayouts<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: ChatModel> Node<DashboardState> for GenerateLayouts<M> {
    async fn run(&self, mut state: DashboardState) -> Result<DashboardState, WorkflowError> {
        let template = PromptTemplate::new(
            format!(
                "You are a UI layout expert. Generate {} distinct layout approaches for the provided data and user request.\n\
                 Make the layouts differ in information hierarchy, visualization method (charts, tables or cards) \
                 and interaction pattern (drill-down, filtering or overview), not just in styling.\n\
                 For each layout provide a unique layout_id, a layout_name, a short description, a page_title, \
                 body-only html, css and js. Pages read their input from `window.componentData`.",
                LAYOUT_COUNT
            ),
            format!("Generate {} different layout options.", LAYOUT_COUNT),
            "Keep the HTML simple and focus on structure.",
        );
        let messages = template.build(
            [
                Some(PromptSection::new("User request", state.question.clone())),
                PromptSection::history(state.memory.earlier_questions()),
                earlier_pages_section(&state.memory.artifacts),
                Some(PromptSection::new("Data", state.data.clone())),
                Some(PromptSection::new("UI descriptors", state.ui_descriptor.clone())),
                Some(PromptSection::new("CSS descriptors", state.css_descriptor.clone())),
            ]
            .into_iter()
            .flatten(),
        );

        let set: LayoutSet =
            ask_structured(self.model.as_ref(), GENERATE_LAYOUTS, &messages).await?;
        state.layouts = set.into_distinct()?;
        info!(
            "🧩 生成了 {} 个候选布局: {}",
            state.layouts.len(),
            state
                .layouts
                .iter()
                .map(|l| l.layout_id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        for layout in &state.layouts {
            state.memory.record(layout.page());
        }
        Ok(state)
    }
}

pub struct FinalizeDashboard<M> {
    model: Arc<M>,
}

impl<M> FinalizeDashboard<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }
}

fn layout_section(layout: &Layout) -> PromptSection {
    PromptSection::new(
        "Selected layout",
        format!(
            "Id: {}\nName: {}\nDescription: {}\n\nHTML:\n{}\n\nCSS:\n{}\n\nJS:\n{}",
            layout.layout_id,
            layout.layout_name,
            layout.description,
            layout.html,
            layout.css,
            layout.js
        ),
    )
}

#[async_trait]
impl<M: ChatModel> Node<DashboardState> for FinalizeDashboard<M> {
    async fn run(&self, mut state: DashboardState) -> Result<DashboardState, WorkflowError> {
        let layout = state
            .selected_layout
            .clone()
            .ok_or_else(|| WorkflowError::invalid(FINALIZE_DASHBOARD, "no layout selected"))?;

        let template = PromptTemplate::new(
            "You are a senior front-end developer. Turn the selected layout into a complete, production-quality dashboard page.\n\
             - Keep the structure of the selected layout\n\
             - The html is body-only; the page loads ./styles.css and ./app.js itself\n\
             - Read input data from `window.componentData` and expose `window.initializeComponent(id)`\n\
             - Use the provided design system classes and component descriptors",
            "Generate a single, complete dashboard component based on the selected layout.",
            "Respond with page_title, html, css and js.",
        );
        let messages = template.build([
            PromptSection::new("User request", state.question.clone()),
            layout_section(&layout),
            PromptSection::new("Data", state.data.clone()),
            PromptSection::new("UI descriptors", state.ui_descriptor.clone()),
            PromptSection::new("CSS descriptors", state.css_descriptor.clone()),
        ]);

        let mut page: PageFiles =
            ask_structured(self.model.as_ref(), FINALIZE_DASHBOARD, &messages).await?;
        if page.html.trim().is_empty() {
            return Err(WorkflowError::invalid(FINALIZE_DASHBOARD, "empty html"));
        }
        if page.page_title.trim().is_empty() {
            page.page_title = layout.page_title.clone();
        }

        state.memory.record(page.clone());
        state.final_page = Some(page);
        Ok(state)
    }
}
