use super::*;
use crate::action::{ActionMeta, Declaration, Hermeticity, Table, TableType};
use crate::settings::ProjectConfig;

fn t(name: &str) -> Target {
    Target::new(Some("D".into()), "dataform", name)
}

fn table(name: &str, deps: &[&str], tags: &[&str], disabled: bool) -> Table {
    Table {
        table_type: TableType::Table,
        enum_type: TableType::Table.enum_type(),
        meta: ActionMeta {
            file_name: format!("definitions/{}.sqlx", name),
            target: t(name),
            canonical_target: t(name),
            dependency_targets: deps.iter().map(|d| t(d)).collect(),
            disabled,
            tags: tags.iter().map(|s| s.to_string()).collect(),
            hermeticity: Hermeticity::Hermetic,
            description: None,
        },
        query: "select 1".to_string(),
        incremental_query: None,
        unique_key: Vec::new(),
        pre_ops: Vec::new(),
        post_ops: Vec::new(),
    }
}

/// raw -> stg -> fct, plus an unrelated tagged table and a disabled one
fn graph() -> CompiledGraph {
    CompiledGraph {
        project_config: ProjectConfig::default(),
        tables: vec![
            table("fct", &["stg"], &["daily"], false),
            table("lonely", &[], &["hourly"], false),
            table("off", &[], &["daily"], true),
            table("raw", &[], &[], false),
            table("stg", &["raw"], &["daily"], false),
        ],
        declarations: vec![Declaration {
            file_name: "definitions/src.sqlx".into(),
            target: Target::new(None, "ext", "src"),
            canonical_target: Target::new(None, "ext", "src"),
            description: None,
        }],
        ..Default::default()
    }
}

fn names(targets: Vec<Target>) -> Vec<String> {
    targets.into_iter().map(|t| t.name).collect()
}

#[test]
fn test_select_all_enabled_in_dependency_order() {
    let selected = select_actions(&graph(), &RunConfig::default()).unwrap();
    assert_eq!(names(selected), vec!["lonely", "raw", "stg", "fct"]);
}

#[test]
fn test_select_by_tags() {
    let run = RunConfig {
        tags: vec!["daily".into()],
        ..Default::default()
    };
    let selected = select_actions(&graph(), &run).unwrap();
    assert_eq!(names(selected), vec!["stg", "fct"]);
}

#[test]
fn test_select_explicit_actions_only() {
    let run = RunConfig {
        actions: vec!["fct".into(), "dataform.raw".into()],
        ..Default::default()
    };
    let selected = select_actions(&graph(), &run).unwrap();
    assert_eq!(names(selected), vec!["raw", "fct"]);
}

#[test]
fn test_explicit_selection_includes_disabled() {
    let run = RunConfig {
        actions: vec!["D.dataform.off".into()],
        ..Default::default()
    };
    assert_eq!(names(select_actions(&graph(), &run).unwrap()), vec!["off"]);
}

#[test]
fn test_unknown_action_is_error() {
    let run = RunConfig {
        actions: vec!["nope".into()],
        ..Default::default()
    };
    let err = select_actions(&graph(), &run).unwrap_err();
    assert!(matches!(err, CoreError::ActionNotFound { ref name } if name == "nope"));
}

#[test]
fn test_include_dependencies_and_dependents() {
    let run = RunConfig {
        actions: vec!["stg".into()],
        include_dependencies: true,
        ..Default::default()
    };
    assert_eq!(names(select_actions(&graph(), &run).unwrap()), vec!["raw", "stg"]);

    let run = RunConfig {
        actions: vec!["stg".into()],
        include_dependents: true,
        ..Default::default()
    };
    assert_eq!(names(select_actions(&graph(), &run).unwrap()), vec!["stg", "fct"]);
}

#[test]
fn test_declarations_never_selected() {
    let all = select_actions(&graph(), &RunConfig::default()).unwrap();
    assert!(all.iter().all(|t| t.name != "src"));
}

#[test]
fn test_naming_a_declaration_is_error() {
    for name in ["src", "ext.src"] {
        let run = RunConfig {
            actions: vec![name.into()],
            ..Default::default()
        };
        let err = select_actions(&graph(), &run).unwrap_err();
        assert!(
            matches!(err, CoreError::DeclarationNotRunnable { name: ref n } if n == name),
            "got: {err}"
        );
        assert!(err.to_string().contains("declarations cannot be run"));
    }
}
