use std::sync::Arc;

use serde_json::{Value, json};

use super::*;
use crate::checkpoint::InMemoryCheckpointStore;
use crate::config::CommitPolicy;
use crate::generator::runner::WorkflowRunner;
use crate::llm::ScriptedModel;

fn layout(id: &str) -> Value {
    json!({
        "layout_id": id,
        "layout_name": format!("Layout {}", id),
        "description": "cards first",
        "page_title": format!("Title {}", id),
        "html": format!("<section id=\"{}\"></section>", id),
        "css": "section {}",
        "js": ""
    })
}

fn three_layouts(ids: [&str; 3]) -> Value {
    json!({ "layouts": ids.iter().map(|id| layout(id)).collect::<Vec<_>>() })
}

fn runner(model: Arc<ScriptedModel>) -> WorkflowRunner<DashboardState> {
    WorkflowRunner::new(
        build_graph(model).unwrap(),
        Arc::new(InMemoryCheckpointStore::new()),
        CommitPolicy::OnSuccess,
    )
}

#[test]
fn test_into_distinct_keeps_valid_ids() {
    let set: LayoutSet = serde_json::from_value(three_layouts(["a", "b", "c"])).unwrap();
    let ids: Vec<_> = set
        .into_distinct()
        .unwrap()
        .into_iter()
        .map(|l| l.layout_id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_into_distinct_renumbers_duplicates_and_blanks() {
    for ids in [["a", "a", "b"], ["", "b", "c"], ["layout-2", " ", "x"]] {
        let set: LayoutSet = serde_json::from_value(three_layouts(ids)).unwrap();
        let ids: Vec<_> = set
            .into_distinct()
            .unwrap()
            .into_iter()
            .map(|l| l.layout_id)
            .collect();
        assert_eq!(ids, vec!["layout-1", "layout-2", "layout-3"]);
    }
}

#[test]
fn test_into_distinct_rejects_wrong_count() {
    let set = LayoutSet {
        layouts: vec![Layout::default(), Layout::default()],
    };
    assert!(matches!(
        set.into_distinct(),
        Err(WorkflowError::InvalidOutput {
            node: GENERATE_LAYOUTS,
            ..
        })
    ));
}

#[tokio::test]
async fn test_layout_phase_produces_three_layouts() {
    let model = Arc::new(ScriptedModel::new().push_json(three_layouts(["a", "a", "a"])));
    let graph = build_graph(model.clone()).unwrap();

    let run = graph
        .invoke(DashboardState::layouts("sales overview", "[]", "[]", ""))
        .await
        .unwrap();

    assert_eq!(run.path, vec![ROUTE_PHASE, GENERATE_LAYOUTS]);
    assert_eq!(run.state.layouts.len(), LAYOUT_COUNT);
    let ids: HashSet<_> = run.state.layouts.iter().map(|l| l.layout_id.as_str()).collect();
    assert_eq!(ids.len(), LAYOUT_COUNT);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn test_finalize_without_selected_layout_fails() {
    let model = Arc::new(ScriptedModel::new());
    let graph = build_graph(model.clone()).unwrap();

    let state = DashboardState {
        phase: DashboardPhase::Final,
        ..DashboardState::default()
    };
    let err = graph.invoke(state).await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::InvalidOutput {
            node: FINALIZE_DASHBOARD,
            ..
        }
    ));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_finalize_uses_checkpointed_layouts_and_question() {
    let model = Arc::new(
        ScriptedModel::new()
            .push_json(three_layouts(["grid", "table", "cards"]))
            .push_json(json!({"page_title": "", "html": "<main>final</main>", "css": "", "js": ""})),
    );
    let runner = runner(model.clone());

    runner
        .run("s", DashboardState::layouts("sales overview", "[42]", "[]", ""))
        .await
        .unwrap();

    let saved = runner.latest_state("s").await.unwrap().unwrap();
    let chosen = saved.find_layout("table").cloned().unwrap();
    assert!(saved.find_layout("missing").is_none());

    let outcome = runner
        .run("s", DashboardState::finalize(chosen, "[]", ""))
        .await
        .unwrap();

    assert_eq!(outcome.path, vec![ROUTE_PHASE, FINALIZE_DASHBOARD]);
    assert_eq!(outcome.state.question, "sales overview");
    assert_eq!(outcome.state.layouts.len(), 3);
    let page = outcome.state.final_page.unwrap();
    assert_eq!(page.html, "<main>final</main>");
    assert_eq!(page.page_title, "Title table");

    let prompt = &model.calls()[1][1].content;
    assert!(prompt.contains("Id: table"));
    assert!(prompt.contains("[42]"));
    assert_eq!(outcome.state.memory.history.len(), 1);
    // 三个候选布局加上定稿页面
    assert_eq!(outcome.state.memory.artifacts.len(), 4);
    assert_eq!(outcome.state.memory.artifacts[3].html, "<main>final</main>");
}

#[tokio::test]
async fn test_second_layout_run_sees_earlier_layouts() {
    let model = Arc::new(
        ScriptedModel::new()
            .push_json(three_layouts(["grid", "table", "cards"]))
            .push_json(three_layouts(["a", "b", "c"])),
    );
    let runner = runner(model.clone());

    runner
        .run("s", DashboardState::layouts("sales overview", "[1]", "[]", ""))
        .await
        .unwrap();
    let outcome = runner
        .run("s", DashboardState::layouts("more compact", "[1]", "[]", ""))
        .await
        .unwrap();

    let first_prompt = &model.calls()[0][1].content;
    assert!(!first_prompt.contains("### Earlier pages"));

    let second_prompt = &model.calls()[1][1].content;
    assert!(second_prompt.contains("### Earlier pages\n1. Title grid\n2. Title table\n3. Title cards"));
    assert!(second_prompt.contains("1. sales overview"));
    assert_eq!(outcome.state.memory.artifacts.len(), 6);
}
