use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{
    CHOOSE_DESCRIPTOR, CLASSIFY, ComponentKind, EXTRACT_DATA, GENERATE, SUGGEST_FOLLOWUPS,
    UiComponentState,
};
use crate::generator::graph::Node;
use crate::generator::prompt::{PromptSection, PromptTemplate, ask_structured, ask_text};
use crate::generator::rechart::ChartComponent;
use crate::generator::types::WorkflowError;
use crate::llm::ChatModel;

/// 建议的后续提问数量上限
const MAX_FOLLOW_UPS: usize = 3;

macro_rules! model_node {
    ($name:ident) => {
        pub struct $name<M> {
            model: Arc<M>,
        }

        impl<M> $name<M> {
            pub fn new(model: Arc<M>) -> Self {
                Self { model }
            }
        }
    };
}

model_node!(ExtractData);
model_node!(Classify);
model_node!(ChooseDescriptor);
model_node!(SuggestFollowUps);
model_node!(GenerateUiComponent);

#[async_trait]
impl<M: ChatModel> Node<UiComponentState> for ExtractData<M> {
    async fn run(&self, mut state: UiComponentState) -> Result<UiComponentState, WorkflowError> {
        let template = PromptTemplate::new(
            "You are a specialized assistant. Answer the user's question carefully from the provided dataset. Extract all the information that answers the question and return only the relevant information.",
            "Provide an answer for the user's question.",
            "",
        );
        let dataset_title = match state.dataset_name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!("Dataset `{}`\n", name),
            _ => String::new(),
        };
        let messages = template.build(
            [
                Some(PromptSection::new("Question", state.question.clone())),
                PromptSection::history(state.memory.earlier_questions()),
                Some(PromptSection::new(
                    "Provided data",
                    format!("{}{}", dataset_title, state.provided_data),
                )),
            ]
            .into_iter()
            .flatten(),
        );
        state.extracted_data = ask_text(self.model.as_ref(), EXTRACT_DATA, &messages).await?;
        Ok(state)
    }
}

#[async_trait]
impl<M: ChatModel> Node<UiComponentState> for Classify<M> {
    async fn run(&self, mut state: UiComponentState) -> Result<UiComponentState, WorkflowError> {
        let template = PromptTemplate::new(
            "You are a UI/UX analyst. Decide whether the user's request needs a chart or a regular UI component.\n\
             Respond with ONLY one word:\n\
             - \"chart\" for any chart, graph, plot, trend or other data visualization\n\
             - \"ui\" for regular UI components such as cards, tables, lists or forms",
            "Determine the component type for this request.",
            "Respond with either \"chart\" or \"ui\" only.",
        );
        let messages = template.build([
            PromptSection::new("User question", state.question.clone()),
            PromptSection::new("Extracted data", state.extracted_data.clone()),
        ]);
        let answer = ask_text(self.model.as_ref(), CLASSIFY, &messages).await?;
        state.component_kind = ComponentKind::parse(&answer);
        debug!("🏷️ 分类结果 `{}` -> {:?}", answer.trim(), state.component_kind);
        Ok(state)
    }
}

#[async_trait]
impl<M: ChatModel> Node<UiComponentState> for ChooseDescriptor<M> {
    async fn run(&self, mut state: UiComponentState) -> Result<UiComponentState, WorkflowError> {
        let template = PromptTemplate::new(
            "You are a specialized dashboard designer. Choose the UI component descriptor from the provided components that fits the extracted data.",
            "Choose a UI component descriptor for the extracted data.",
            "Return the chosen descriptor.",
        );
        let messages = template.build([
            PromptSection::new("Extracted data", state.extracted_data.clone()),
            PromptSection::new("Provided UI components", state.component_descriptors.clone()),
        ]);
        state.component_schema =
            ask_text(self.model.as_ref(), CHOOSE_DESCRIPTOR, &messages).await?;
        Ok(state)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
struct FollowUps {
    /// 用户接下来可能提出的问题
    #[serde(default)]
    questions: Vec<String>,
}

#[async_trait]
impl<M: ChatModel> Node<UiComponentState> for SuggestFollowUps<M> {
    async fn run(&self, mut state: UiComponentState) -> Result<UiComponentState, WorkflowError> {
        let template = PromptTemplate::new(
            "You help users explore their data. Suggest short follow-up questions the user could ask next about the same dataset.",
            "Suggest up to three follow-up questions.",
            "Each question must be answerable from the extracted data.",
        );
        let messages = template.build([
            PromptSection::new("User question", state.question.clone()),
            PromptSection::new("Extracted data", state.extracted_data.clone()),
            PromptSection::new("Chosen component", state.component_schema.clone()),
        ]);
        let suggestions: FollowUps =
            ask_structured(self.model.as_ref(), SUGGEST_FOLLOWUPS, &messages).await?;
        state.follow_ups = suggestions
            .questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(MAX_FOLLOW_UPS)
            .collect();
        Ok(state)
    }
}

fn chart_template() -> PromptTemplate {
    PromptTemplate::new(
        "You are a React developer skilled at creating chart components with the Recharts library.\n\
         - Import React and the necessary Recharts components\n\
         - Use ResponsiveContainer so the chart is responsive\n\
         - Define the \"data\" variable at the beginning of the component with the provided data\n\
         - Wrap the chart in \"component-container\"\n\
         - The component must end with \"export default [ComponentName]\"\n\
         - List every Recharts component used in rechartComponents",
        "Create a Recharts component using the provided data.",
        "Respond with name (PascalCase), component and rechartComponents.",
    )
}

fn ui_template() -> PromptTemplate {
    PromptTemplate::new(
        "You are a React developer skilled at creating interactive UI components.\n\
         - The component MUST ONLY include one import statement: \"import React from 'react';\"\n\
         - Do not use any external dependency; use React hooks for interactivity\n\
         - Tables get sortable headers and a filter input\n\
         - Wrap the main content in \"component-container\" and use the existing design classes\n\
         - The component must end with \"export default [ComponentName]\"",
        "Create a React component using the provided data and the UI component descriptor.",
        "Respond with name (PascalCase) and component.",
    )
}

#[async_trait]
impl<M: ChatModel> Node<UiComponentState> for GenerateUiComponent<M> {
    async fn run(&self, mut state: UiComponentState) -> Result<UiComponentState, WorkflowError> {
        let previous = state
            .memory
            .artifacts
            .last()
            .map(|a| PromptSection::new("Previous component", a.component.clone()));

        let messages = match state.component_kind {
            ComponentKind::Chart => chart_template().build(
                [
                    Some(PromptSection::new("User question", state.question.clone())),
                    Some(PromptSection::new("Extracted data", state.extracted_data.clone())),
                    previous,
                ]
                .into_iter()
                .flatten(),
            ),
            ComponentKind::Ui => ui_template().build(
                [
                    Some(PromptSection::new("User question", state.question.clone())),
                    Some(PromptSection::new(
                        "UI component descriptor",
                        state.component_schema.clone(),
                    )),
                    Some(PromptSection::new("Provided data", state.extracted_data.clone())),
                    previous,
                ]
                .into_iter()
                .flatten(),
            ),
        };

        let mut component: ChartComponent =
            ask_structured(self.model.as_ref(), GENERATE, &messages).await?;
        if component.component.trim().is_empty() {
            return Err(WorkflowError::invalid(GENERATE, "empty component code"));
        }
        if state.component_kind == ComponentKind::Ui {
            component.rechart_components.clear();
        }

        state.memory.record(component.clone());
        state.result = Some(component);
        Ok(state)
    }
}
