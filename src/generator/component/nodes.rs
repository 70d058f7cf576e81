use async_trait::async_trait;
use std::sync::Arc;

use super::{ANALYZE_DATA, COMPONENT_PLAN, ComponentArtifact, ComponentState, GENERATE};
use crate::generator::graph::Node;
use crate::generator::prompt::{PromptSection, PromptTemplate, ask_structured, ask_text};
use crate::generator::types::WorkflowError;
use crate::llm::ChatModel;

pub struct AnalyzeData<M> {
    model: Arc<M>,
}

impl<M> AnalyzeData<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new(
            "You are a data analyst. Read the provided data in light of the user's question and pull out every piece of information that answers it. Return only the extracted information.",
            "Extract the information that answers the question below.",
            "Respond with the extracted information only, no commentary.",
        )
    }
}

#[async_trait]
impl<M: ChatModel> Node<ComponentState> for AnalyzeData<M> {
    async fn run(&self, mut state: ComponentState) -> Result<ComponentState, WorkflowError> {
        let messages = Self::template().build(
            [
                Some(PromptSection::new("Question", state.question.clone())),
                PromptSection::history(state.memory.earlier_questions()),
                Some(PromptSection::new("Data", state.data.clone())),
            ]
            .into_iter()
            .flatten(),
        );
        state.analyzed_data = ask_text(self.model.as_ref(), ANALYZE_DATA, &messages).await?;
        Ok(state)
    }
}

pub struct ComponentPlan<M> {
    model: Arc<M>,
}

impl<M> ComponentPlan<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: ChatModel> Node<ComponentState> for ComponentPlan<M> {
    async fn run(&self, mut state: ComponentState) -> Result<ComponentState, WorkflowError> {
        let template = PromptTemplate::new(
            "You design UI components. Pick the predefined components that best present the analyzed data and describe how each one is filled with it.",
            "Choose from the predefined components and fill them with the analyzed data.",
            "Only use components from the predefined list.",
        );
        let messages = template.build([
            PromptSection::new("Analyzed data", state.analyzed_data.clone()),
            PromptSection::json("Predefined components", &state.catalog),
        ]);
        state.component_plan = ask_text(self.model.as_ref(), COMPONENT_PLAN, &messages).await?;
        Ok(state)
    }
}

pub struct GenerateComponent<M> {
    model: Arc<M>,
}

impl<M> GenerateComponent<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: ChatModel> Node<ComponentState> for GenerateComponent<M> {
    async fn run(&self, mut state: ComponentState) -> Result<ComponentState, WorkflowError> {
        let template = PromptTemplate::new(
            "You are a front-end developer. Combine the planned components into a single renderable React component. Answer with the component name and its code; the code must end with `export default <ComponentName>`.",
            "Create one React component from the plan below.",
            "If a previous component is listed, refine it according to the latest request instead of starting over.",
        );
        let previous = state
            .memory
            .artifacts
            .last()
            .map(|a| PromptSection::new("Previous component", a.component.clone()));
        let messages = template.build(
            [
                Some(PromptSection::new("Request", state.question.clone())),
                Some(PromptSection::new("Component plan", state.component_plan.clone())),
                previous,
            ]
            .into_iter()
            .flatten(),
        );

        let artifact: ComponentArtifact =
            ask_structured(self.model.as_ref(), GENERATE, &messages).await?;
        if artifact.component.trim().is_empty() {
            return Err(WorkflowError::invalid(GENERATE, "empty component code"));
        }

        state.memory.record(artifact.clone());
        state.result = Some(artifact);
        Ok(state)
    }
}
