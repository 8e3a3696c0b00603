use super::*;
use std::fs;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_parse_minimal_settings() {
    let config: ProjectConfig = serde_yaml::from_str("defaultDatabase: D\n").unwrap();
    assert_eq!(config.default_database.as_deref(), Some("D"));
    assert_eq!(config.warehouse(), Warehouse::BigQuery);
    assert_eq!(config.default_schema(), "dataform");
    assert_eq!(config.assertion_schema(), "dataform_assertions");
    assert!(!config.assertions_disabled());
}

#[test]
fn test_parse_full_settings() {
    let yaml = r#"
warehouse: snowflake
defaultDatabase: ANALYTICS
defaultSchema: core
assertionSchema: checks
defaultLocation: US
schemaSuffix: dev
coreVersion: 3.0.0
disableAssertions: true
vars:
  testVar1: one
  limit: 10
  enabled: true
storage:
  bucketName: lake
  tableFolderRoot: tables
"#;
    let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.warehouse(), Warehouse::Snowflake);
    assert_eq!(config.default_schema(), "core");
    assert_eq!(config.assertion_schema(), "checks");
    assert_eq!(config.schema_suffix.as_deref(), Some("dev"));
    assert_eq!(config.core_version.as_deref(), Some("3.0.0"));
    assert!(config.assertions_disabled());
    assert_eq!(config.vars.get("limit").map(String::as_str), Some("10"));
    assert_eq!(config.vars.get("enabled").map(String::as_str), Some("true"));
    assert_eq!(
        config.storage.as_ref().and_then(|s| s.bucket_name.as_deref()),
        Some("lake")
    );
}

#[test]
fn test_unknown_settings_field_rejected() {
    let result: Result<ProjectConfig, _> = serde_yaml::from_str("defaultDatabse: D\n");
    assert!(result.is_err());
}

#[test]
fn test_serialized_config_mirrors_file() {
    let config: ProjectConfig =
        serde_yaml::from_str("defaultDatabase: D\nvars:\n  a: b\n").unwrap();
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"defaultDatabase": "D", "vars": {"a": "b"}})
    );
}

#[test]
fn test_overrides_replace_only_named_fields() {
    let config = ProjectConfig {
        default_database: Some("D".into()),
        default_schema: Some("core".into()),
        vars: BTreeMap::from([("a".to_string(), "1".to_string())]),
        ..Default::default()
    };
    let overrides = SettingsOverrides {
        vars: BTreeMap::from([("b".to_string(), "2".to_string())]),
        schema_suffix: Some("pr_1".into()),
        ..Default::default()
    };
    let merged = config.with_overrides(&overrides);
    assert_eq!(merged.default_database.as_deref(), Some("D"));
    assert_eq!(merged.default_schema(), "core");
    assert_eq!(merged.schema_suffix.as_deref(), Some("pr_1"));
    assert_eq!(merged.vars.len(), 2);
}

#[test]
fn test_disable_assertions_override_is_or() {
    let config = ProjectConfig {
        disable_assertions: Some(true),
        ..Default::default()
    };
    let merged = config.clone().with_overrides(&SettingsOverrides::default());
    assert!(merged.assertions_disabled());

    let merged = ProjectConfig::default().with_overrides(&SettingsOverrides {
        disable_assertions: true,
        ..Default::default()
    });
    assert!(merged.assertions_disabled());
}

#[test]
fn test_parse_vars() {
    let vars = SettingsOverrides::parse_vars("testVar1=a, testVar2=v2").unwrap();
    assert_eq!(vars.get("testVar1").map(String::as_str), Some("a"));
    assert_eq!(vars.get("testVar2").map(String::as_str), Some("v2"));
    assert!(SettingsOverrides::parse_vars("").unwrap().is_empty());
}

#[test]
fn test_parse_vars_rejects_malformed_pairs() {
    let err = SettingsOverrides::parse_vars("novalue").unwrap_err();
    assert!(matches!(err, CoreError::InvalidOverride { .. }));
    assert!(SettingsOverrides::parse_vars("=x").is_err());
}

#[test]
fn test_invalid_schema_suffix_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        WORKFLOW_SETTINGS_FILE,
        "coreVersion: 3.0.0\nschemaSuffix: bad-suffix\n",
    );
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    assert!(matches!(err, CoreError::SettingsInvalid { .. }));
}

#[test]
fn test_resolve_missing_settings() {
    let tmp = TempDir::new().unwrap();
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    assert!(matches!(err, CoreError::SettingsNotFound { .. }));
}

#[test]
fn test_resolve_pinned_version() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        WORKFLOW_SETTINGS_FILE,
        "coreVersion: 3.0.0\ndefaultDatabase: D\n",
    );
    let config = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap();
    assert_eq!(config.default_database.as_deref(), Some("D"));
}

#[test]
fn test_resolve_pinned_version_with_manifest_fails() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), WORKFLOW_SETTINGS_FILE, "coreVersion: 3.0.0\n");
    write(
        tmp.path(),
        "packages.json",
        r#"{"dependencies": {"dagform-core": "^3.0.0"}}"#,
    );
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    match err {
        CoreError::PinnedVersionConflict { path, .. } => assert!(path.ends_with("packages.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_resolve_pinned_version_with_lockfile_fails() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), WORKFLOW_SETTINGS_FILE, "coreVersion: 3.0.0\n");
    write(tmp.path(), "packages.lock", "");
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    assert!(err.to_string().contains("packages.lock"));
}

#[test]
fn test_resolve_without_core_version_or_manifest() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), WORKFLOW_SETTINGS_FILE, "defaultDatabase: D\n");
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    assert!(matches!(err, CoreError::MissingCoreDependency { .. }));
}

#[test]
fn test_resolve_legacy_project_requires_installed_core() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), LEGACY_SETTINGS_FILE, r#"{"defaultDatabase": "D"}"#);
    write(
        tmp.path(),
        "packages.json",
        r#"{"dependencies": {"dagform-core": "^3.0.0"}}"#,
    );
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    assert!(matches!(err, CoreError::CoreNotInstalled { .. }));

    write(
        tmp.path(),
        "dagform_packages/dagform-core/packages.json",
        r#"{"name": "dagform-core", "version": "3.2.0"}"#,
    );
    let config = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap();
    assert_eq!(config.default_database.as_deref(), Some("D"));
}

#[test]
fn test_resolve_legacy_project_version_mismatch() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), LEGACY_SETTINGS_FILE, "{}");
    write(
        tmp.path(),
        "packages.json",
        r#"{"dependencies": {"dagform-core": "^3.0.0"}}"#,
    );
    write(
        tmp.path(),
        "dagform_packages/dagform-core/packages.json",
        r#"{"name": "dagform-core", "version": "2.9.0"}"#,
    );
    let err = ProjectConfig::resolve(tmp.path(), &SettingsOverrides::default()).unwrap_err();
    assert!(matches!(err, CoreError::CoreVersionMismatch { .. }));
}

#[test]
fn test_workflow_settings_win_over_legacy() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), WORKFLOW_SETTINGS_FILE, "coreVersion: 3.0.0\n");
    write(tmp.path(), LEGACY_SETTINGS_FILE, "{}");
    let (source, _) = SettingsSource::locate(tmp.path()).unwrap();
    assert_eq!(source, SettingsSource::Workflow);
}

#[test]
fn test_empty_settings_file_is_default() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), WORKFLOW_SETTINGS_FILE, "");
    let config = ProjectConfig::load(&tmp.path().join(WORKFLOW_SETTINGS_FILE)).unwrap();
    assert_eq!(config, ProjectConfig::default());
}

#[test]
fn test_large_integer_var_kept_exactly() {
    let config: ProjectConfig =
        serde_yaml::from_str("vars:\n  big: 12345678901234567890\n  small: -3\n").unwrap();
    assert_eq!(
        config.vars.get("big").map(String::as_str),
        Some("12345678901234567890")
    );
    assert_eq!(config.vars.get("small").map(String::as_str), Some("-3"));
}

#[test]
fn test_unquoted_decimal_var_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "workflow_settings.yaml",
        "defaultDatabase: D\nvars:\n  version: 1.10\n",
    );
    let err = ProjectConfig::load(&tmp.path().join("workflow_settings.yaml")).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("[E002]"), "got: {}", message);
    assert!(message.contains("'version'"));
    assert!(message.contains("quote it"));

    write(
        tmp.path(),
        "workflow_settings.yaml",
        "defaultDatabase: D\nvars:\n  version: \"1.10\"\n",
    );
    let config = ProjectConfig::load(&tmp.path().join("workflow_settings.yaml")).unwrap();
    assert_eq!(config.vars.get("version").map(String::as_str), Some("1.10"));
}
