use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::checkpoint::InMemoryCheckpointStore;
use crate::config::CommitPolicy;
use crate::generator::runner::WorkflowRunner;
use crate::llm::ScriptedModel;

const REVENUE: &str = r#"[{"year":2023,"revenue":100},{"year":2024,"revenue":150}]"#;
const CATALOG: &str = r#"[{"type":"Card"},{"type":"MetricBox"}]"#;

#[test]
fn test_component_kind_parse() {
    assert_eq!(ComponentKind::parse("chart"), ComponentKind::Chart);
    assert_eq!(ComponentKind::parse("  Chart.\n"), ComponentKind::Chart);
    assert_eq!(ComponentKind::parse("\"CHART\""), ComponentKind::Chart);
    assert_eq!(ComponentKind::parse("ui"), ComponentKind::Ui);
    assert_eq!(ComponentKind::parse("a table, I think"), ComponentKind::Ui);
    assert_eq!(ComponentKind::parse(""), ComponentKind::Ui);
}

#[tokio::test]
async fn test_revenue_trend_takes_chart_branch() {
    let model = Arc::new(
        ScriptedModel::new()
            .push_reply("2023: 100, 2024: 150")
            .push_reply("chart")
            .push_json(json!({
                "name": "RevenueTrend",
                "component": "const data = [{ year: 2023, revenue: 100 }, { year: 2024, revenue: 150 }];\nexport default RevenueTrend",
                "rechartComponents": ["LineChart", "Line", "ResponsiveContainer"]
            })),
    );
    let graph = build_graph(model.clone()).unwrap();

    let run = graph
        .invoke(UiComponentState::new("show revenue trend", REVENUE, CATALOG))
        .await
        .unwrap();

    assert_eq!(run.path, vec![EXTRACT_DATA, CLASSIFY, GENERATE]);
    assert!(!run.path.iter().any(|n| n == CHOOSE_DESCRIPTOR));
    assert_eq!(run.state.component_kind, ComponentKind::Chart);

    let result = run.state.result.unwrap();
    assert!(!result.component.is_empty());
    assert!(result.component.contains("2023") && result.component.contains("100"));
    assert!(result.component.contains("2024") && result.component.contains("150"));
    assert!(run.state.follow_ups.is_empty());

    // 图表分支使用Recharts提示词
    let calls = model.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[2][0].content.contains("Recharts"));
}

#[tokio::test]
async fn test_unrecognized_label_defaults_to_ui_branch() {
    let model = Arc::new(
        ScriptedModel::new()
            .push_reply("patient has 3 visits")
            .push_reply("maybe a table?")
            .push_reply(r#"{"type":"Card"}"#)
            .push_json(json!({"questions": ["Which visit was longest?", " ", "Any trend?", "Who?", "Why?"]}))
            .push_json(json!({
                "name": "VisitCard",
                "component": "import React from 'react';\nexport default VisitCard",
                "rechartComponents": ["BarChart"]
            })),
    );
    let graph = build_graph(model.clone()).unwrap();

    let run = graph
        .invoke(UiComponentState::new("list my visits", "[]", CATALOG))
        .await
        .unwrap();

    assert_eq!(
        run.path,
        vec![EXTRACT_DATA, CLASSIFY, CHOOSE_DESCRIPTOR, SUGGEST_FOLLOWUPS, GENERATE]
    );
    assert_eq!(run.state.component_kind, ComponentKind::Ui);
    assert_eq!(run.state.component_schema, r#"{"type":"Card"}"#);
    assert_eq!(
        run.state.follow_ups,
        vec!["Which visit was longest?", "Any trend?", "Who?"]
    );

    let result = run.state.result.unwrap();
    assert!(result.rechart_components.is_empty());

    let calls = model.calls();
    assert!(calls[2][1].content.contains(CATALOG));
    assert!(calls[4][0].content.contains("import React from 'react';"));
}

#[tokio::test]
async fn test_dataset_name_reaches_extract_prompt() {
    let model = Arc::new(
        ScriptedModel::new()
            .push_reply("x")
            .push_reply("chart")
            .push_json(json!({"name": "C", "component": "export default C"})),
    );
    let graph = build_graph(model.clone()).unwrap();

    graph
        .invoke(
            UiComponentState::new("q", "a,b\n1,2", CATALOG)
                .with_dataset_name(Some("labs.csv".to_string())),
        )
        .await
        .unwrap();

    assert!(model.calls()[0][1].content.contains("Dataset `labs.csv`"));
}

#[tokio::test]
async fn test_session_accumulates_components() {
    let script = |model: ScriptedModel| {
        model
            .push_reply("data")
            .push_reply("chart")
            .push_json(json!({"name": "C", "component": "export default C"}))
    };
    let model = Arc::new(script(script(ScriptedModel::new())));
    let runner = WorkflowRunner::new(
        build_graph(model.clone()).unwrap(),
        Arc::new(InMemoryCheckpointStore::new()),
        CommitPolicy::OnSuccess,
    );

    runner
        .run("s", UiComponentState::new("first", REVENUE, CATALOG))
        .await
        .unwrap();
    let outcome = runner
        .run("s", UiComponentState::new("second", REVENUE, CATALOG))
        .await
        .unwrap();

    assert_eq!(outcome.state.memory.history.len(), 2);
    assert_eq!(outcome.state.memory.artifacts.len(), 2);
    assert!(model.calls()[3][1].content.contains("1. first"));
}
