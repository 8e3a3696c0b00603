use super::*;
use crate::plan::TaskType;
use df_core::{
    ActionDraft, ActionIdentity, AssertionSpecs, DraftKind, FileError, GraphBuilder, Hermeticity,
    ProjectConfig, TableType, Target,
};
use pretty_assertions::assert_eq;

fn config() -> ProjectConfig {
    ProjectConfig {
        default_database: Some("D".into()),
        ..Default::default()
    }
}

fn t(name: &str) -> Target {
    Target::new(Some("D".into()), "dataform", name)
}

fn table(name: &str, deps: &[&str], tags: &[&str]) -> ActionDraft {
    ActionDraft {
        file_name: format!("definitions/{}.sqlx", name),
        identity: ActionIdentity::named(name),
        dependencies: deps.iter().map(|d| t(d)).collect(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        disabled: false,
        description: None,
        hermeticity: Hermeticity::Hermetic,
        kind: DraftKind::Table {
            table_type: TableType::Table,
            query: format!("select '{}' as v", name),
            incremental_query: None,
            unique_key: Vec::new(),
            pre_ops: Vec::new(),
            post_ops: Vec::new(),
            assertions: AssertionSpecs::default(),
        },
    }
}

fn assertion(name: &str, parent: &str) -> ActionDraft {
    ActionDraft {
        kind: DraftKind::Assertion {
            query: format!("select * from {} where v is null", parent),
            parent: None,
        },
        ..table(name, &[parent], &[])
    }
}

fn build(config: &ProjectConfig, drafts: Vec<ActionDraft>) -> CompiledGraph {
    GraphBuilder::new(config).build(drafts, Vec::new(), Vec::new())
}

fn names(plan: &ExecutionPlan) -> Vec<&str> {
    plan.actions.iter().map(|a| a.name.as_str()).collect()
}

#[test]
fn test_single_table_plan() {
    let mut drafts = vec![table("example", &[], &[])];
    if let DraftKind::Table { query, .. } = &mut drafts[0].kind {
        *query = "select 1 as v2".to_string();
    }
    let graph = build(&config(), drafts);
    let plan = plan(&graph, &RunConfig::default()).unwrap();

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(plan.actions[0].tasks.len(), 1);
    assert_eq!(
        plan.actions[0].tasks[0].statement,
        "create or replace table `D.dataform.example` as select 1 as v2"
    );
    assert!(plan.warehouse_state.tables.is_empty());
}

#[test]
fn test_plan_follows_dependency_order() {
    let graph = build(
        &config(),
        vec![
            table("a_last", &["m_middle"], &[]),
            table("m_middle", &["z_first"], &[]),
            table("z_first", &[], &[]),
        ],
    );
    let plan = plan(&graph, &RunConfig::default()).unwrap();
    assert_eq!(
        names(&plan),
        vec!["D.dataform.z_first", "D.dataform.m_middle", "D.dataform.a_last"]
    );
}

#[test]
fn test_explicit_actions_only() {
    let graph = build(
        &config(),
        vec![
            table("a", &[], &["daily"]),
            table("b", &["a"], &["daily"]),
            table("c", &["b"], &["daily"]),
        ],
    );
    let run = RunConfig {
        actions: vec!["c".into(), "a".into()],
        ..Default::default()
    };
    let plan = plan(&graph, &run).unwrap();
    assert_eq!(names(&plan), vec!["D.dataform.a", "D.dataform.c"]);
    assert_eq!(plan.run_config, run);
}

#[test]
fn test_tags_select_enabled_actions() {
    let graph = build(
        &config(),
        vec![table("a", &[], &["daily"]), table("b", &[], &["hourly"])],
    );
    let run = RunConfig {
        tags: vec!["hourly".into()],
        ..Default::default()
    };
    assert_eq!(names(&plan(&graph, &run).unwrap()), vec!["D.dataform.b"]);
}

#[test]
fn test_unknown_action_is_an_error() {
    let graph = build(&config(), vec![table("a", &[], &[])]);
    let run = RunConfig {
        actions: vec!["nope".into()],
        ..Default::default()
    };
    let err = plan(&graph, &run).unwrap_err();
    assert!(err.to_string().contains("[E012]"));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_graph_errors_refuse_planning() {
    let graph = GraphBuilder::new(&config()).build(
        vec![table("a", &[], &[])],
        vec![FileError::new("definitions/bad.sqlx", "boom")],
        Vec::new(),
    );
    let err = plan(&graph, &RunConfig::default()).unwrap_err();
    assert!(matches!(err, PlanError::GraphHasErrors { count: 1, .. }));
    assert!(err.to_string().contains("[P002]"));
}

#[test]
fn test_disabled_assertions_yield_no_tasks() {
    let mut config = config();
    config.disable_assertions = Some(true);
    let graph = build(
        &config,
        vec![table("a", &[], &[]), assertion("a_check", "a")],
    );
    // disabled assertions are not selected by default
    let plan_all = plan(&graph, &RunConfig::default()).unwrap();
    assert_eq!(names(&plan_all), vec!["D.dataform.a"]);
    assert_eq!(plan_all.task_count(), 1);

    // and have no tasks when named explicitly
    let run = RunConfig {
        actions: vec!["a_check".into()],
        ..Default::default()
    };
    let plan_named = plan(&graph, &run).unwrap();
    assert_eq!(plan_named.actions.len(), 1);
    assert!(plan_named.actions[0].tasks.is_empty());
}

#[test]
fn test_enabled_assertion_runs_after_parent() {
    let graph = build(
        &config(),
        vec![assertion("a_check", "a"), table("a", &[], &[])],
    );
    let plan = plan(&graph, &RunConfig::default()).unwrap();
    assert_eq!(
        names(&plan),
        vec!["D.dataform.a", "D.dataform_assertions.a_check"]
    );
    assert_eq!(plan.actions[1].tasks[0].task_type, TaskType::Assertion);
}

#[test]
fn test_include_dependencies() {
    let graph = build(
        &config(),
        vec![table("a", &[], &[]), table("b", &["a"], &[]), table("c", &[], &[])],
    );
    let run = RunConfig {
        actions: vec!["b".into()],
        include_dependencies: true,
        ..Default::default()
    };
    assert_eq!(
        names(&plan(&graph, &run).unwrap()),
        vec!["D.dataform.a", "D.dataform.b"]
    );
}

#[test]
fn test_plan_json_shape() {
    let graph = build(&config(), vec![table("a", &[], &[])]);
    let plan = plan(&graph, &RunConfig::default()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["projectConfig"]["defaultDatabase"], "D");
    assert_eq!(json["runConfig"]["fullRefresh"], false);
    assert_eq!(json["warehouseState"], serde_json::json!({"tables": []}));
    assert_eq!(json["actions"][0]["target"]["name"], "a");
}
