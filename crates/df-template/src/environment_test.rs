use super::*;
use df_core::{ActionKind, ProjectConfig, Target, Warehouse};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn names(suffix: Option<&str>) -> Arc<NameTable> {
    let config = ProjectConfig {
        default_database: Some("D".into()),
        schema_suffix: suffix.map(String::from),
        vars: BTreeMap::from([("testVar2".to_string(), "v2".to_string())]),
        ..Default::default()
    };
    let mut names = NameTable::new(&config);
    names.insert(ActionKind::Table, Target::new(Some("D".into()), "dataform", "orders"));
    names.insert(ActionKind::Declaration, Target::new(Some("D".into()), "raw", "events"));
    Arc::new(names)
}

fn env(suffix: Option<&str>) -> TemplateEnvironment<'static> {
    let action = ActionContext {
        name: "example".to_string(),
        target: Target::new(Some("D".into()), "dataform", "example"),
    };
    TemplateEnvironment::new(names(suffix), action).unwrap()
}

#[test]
fn test_render_vars() {
    let rendered = env(None).render("select 1 as ${vars.testVar2}\n").unwrap();
    assert_eq!(rendered, "select 1 as v2");
}

#[test]
fn test_undefined_var_is_error() {
    let err = env(None).render("select ${vars.nope}").unwrap_err();
    assert!(matches!(err, TemplateError::RenderError(_)));
}

#[test]
fn test_unknown_identifier_is_error() {
    assert!(env(None).render("select ${config()}").is_err());
    assert!(env(None).render("select ${project}").is_err());
}

#[test]
fn test_ref_renders_quoted_target_and_registers_dependency() {
    let env = env(None);
    let rendered = env.render(r#"select * from ${ref("orders")}"#).unwrap();
    assert_eq!(rendered, "select * from `D.dataform.orders`");
    let capture = env.capture();
    assert_eq!(
        capture.dependencies.into_iter().collect::<Vec<_>>(),
        vec![Target::new(Some("D".into()), "dataform", "orders")]
    );
}

#[test]
fn test_ref_applies_schema_suffix_to_rendered_name_only() {
    let env = env(Some("dev"));
    let rendered = env.render(r#"select * from ${ref("orders")}"#).unwrap();
    assert_eq!(rendered, "select * from `D.dataform_dev.orders`");
    let capture = env.capture();
    assert!(capture
        .dependencies
        .contains(&Target::new(Some("D".into()), "dataform", "orders")));
}

#[test]
fn test_resolve_does_not_register_dependency() {
    let env = env(None);
    let rendered = env.render(r#"select * from ${resolve("raw", "events")}"#).unwrap();
    assert_eq!(rendered, "select * from `D.raw.events`");
    let capture = env.capture();
    assert!(capture.dependencies.is_empty());
    assert_eq!(capture.referenced.len(), 1);
}

#[test]
fn test_unknown_ref_renders_placeholder() {
    let env = env(None);
    let rendered = env.render(r#"select * from ${ref("missing")}"#).unwrap();
    assert_eq!(rendered, "select * from `D.dataform.missing`");
    assert_eq!(env.capture().dependencies.len(), 1);
}

#[test]
fn test_ambiguous_ref_is_typed_error() {
    let config = ProjectConfig::default();
    let mut names = NameTable::new(&config);
    names.insert(ActionKind::Table, Target::new(None, "a", "dup"));
    names.insert(ActionKind::Table, Target::new(None, "b", "dup"));
    let action = ActionContext {
        name: "x".into(),
        target: Target::new(None, "dataform", "x"),
    };
    let env = TemplateEnvironment::new(Arc::new(names), action).unwrap();
    let err = env.render(r#"${ref("dup")}"#).unwrap_err();
    assert!(matches!(err, TemplateError::AmbiguousReference { .. }));
    assert!(env.render(r#"${ref("a", "dup")}"#).is_ok());
}

#[test]
fn test_invalid_ref_arguments() {
    let err = env(None).render(r#"${ref("a", "b", "c", "d")}"#).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidReference { .. }));
}

#[test]
fn test_self_and_name() {
    let env = env(Some("dev"));
    let rendered = env
        .render("insert into ${self()} select '${name()}'")
        .unwrap();
    assert_eq!(rendered, "insert into `D.dataform.example` select 'example'");
}

#[test]
fn test_incremental_flag() {
    let env = env(None);
    let template =
        "select * from src{% if incremental() %} where ts > (select max(ts) from ${self()}){% endif %}";
    assert_eq!(env.render(template).unwrap(), "select * from src");
    assert_eq!(
        env.render_incremental(template).unwrap(),
        "select * from src where ts > (select max(ts) from `D.dataform.example`)"
    );
    // flag resets after an incremental render
    assert_eq!(env.render(template).unwrap(), "select * from src");
}

#[test]
fn test_when() {
    let env = env(None);
    assert_eq!(
        env.render(r#"select ${when(incremental(), "a", "b")}"#).unwrap(),
        "select b"
    );
    assert_eq!(env.render(r#"select 1 ${when(false, "x")}"#).unwrap(), "select 1");
}

#[test]
fn test_snowflake_quoting() {
    let config = ProjectConfig {
        warehouse: Some(Warehouse::Snowflake),
        default_database: Some("DB".into()),
        ..Default::default()
    };
    let mut names = NameTable::new(&config);
    names.insert(ActionKind::Table, Target::new(Some("DB".into()), "dataform", "t"));
    let action = ActionContext {
        name: "x".into(),
        target: Target::new(Some("DB".into()), "dataform", "x"),
    };
    let env = TemplateEnvironment::new(Arc::new(names), action).unwrap();
    assert_eq!(
        env.render(r#"select * from ${ref("t")}"#).unwrap(),
        r#"select * from "DB"."dataform"."t""#
    );
}
