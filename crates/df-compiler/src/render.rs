//! Second compile phase: render one definition into an action draft

use crate::hermeticity::infer_hermeticity;
use df_core::{
    ActionConfig, ActionDraft, ActionIdentity, ActionKind, ActionRef, CoreError, DefinitionFile,
    DraftKind, FileError, Hermeticity, NameTable, Resolution, TableType, Target,
};
use df_sql::SqlParser;
use df_template::{ActionContext, TemplateEnvironment, TemplateError, TemplateResult};
use std::sync::Arc;

/// Identity declared by a definition file
pub fn declared_identity(def: &DefinitionFile) -> ActionIdentity {
    ActionIdentity {
        name: def.action_name().to_string(),
        schema: def.config.declared_schema().map(String::from),
        database: def.config.declared_database().map(String::from),
    }
}

/// Render a parsed definition against the project's name table.
///
/// Every failure is reported against the definition's path.
pub fn compile_definition(
    def: &DefinitionFile,
    names: Arc<NameTable>,
) -> Result<ActionDraft, FileError> {
    let fail = |e: &dyn std::fmt::Display| FileError::new(def.path.clone(), e);
    let identity = declared_identity(def);

    let common = match &def.config {
        ActionConfig::Declaration(decl) => {
            return Ok(ActionDraft {
                file_name: def.path.clone(),
                identity,
                dependencies: Vec::new(),
                tags: Vec::new(),
                disabled: false,
                description: decl.description.clone(),
                hermeticity: Hermeticity::Hermetic,
                kind: DraftKind::Declaration,
            });
        }
        other => other.common().cloned().unwrap_or_default(),
    };

    let kind = def.config.action_kind();
    let config = names.config();
    let canonical = config.canonical_target(kind, &identity);
    let runtime = config.runtime_target(kind, &canonical);
    let parser = SqlParser::from_dialect_name(&config.warehouse().to_string()).map_err(|e| fail(&e))?;

    let mut dependencies = config_dependencies(&common.dependencies, &names).map_err(|e| fail(&e))?;

    let env = TemplateEnvironment::new(
        Arc::clone(&names),
        ActionContext {
            name: identity.name.clone(),
            target: runtime,
        },
    )
    .map_err(|e| fail(&e))?;

    let draft_kind = match &def.config {
        ActionConfig::Table {
            table_type,
            assertions,
            unique_key,
            ..
        } => {
            let query = render_query(&env, def, kind)?;
            let incremental_query = match table_type {
                TableType::Incremental => {
                    Some(env.render_incremental(&def.body).map_err(|e| fail(&e))?)
                }
                _ => None,
            };
            DraftKind::Table {
                table_type: *table_type,
                query,
                incremental_query,
                unique_key: unique_key.clone(),
                pre_ops: render_statements(&env, def.pre_operations.as_deref())
                    .map_err(|e| fail(&e))?,
                post_ops: render_statements(&env, def.post_operations.as_deref())
                    .map_err(|e| fail(&e))?,
                assertions: assertions.clone(),
            }
        }
        ActionConfig::Assertion { .. } => DraftKind::Assertion {
            query: render_query(&env, def, kind)?,
            parent: None,
        },
        ActionConfig::Operations { has_output, .. } => DraftKind::Operation {
            queries: render_statements(&env, Some(&def.body)).map_err(|e| fail(&e))?,
            has_output: *has_output,
        },
        ActionConfig::Declaration(_) => DraftKind::Declaration,
    };

    let capture = env.capture();
    dependencies.extend(capture.dependencies);

    let hermeticity = match common.hermetic {
        Some(true) => Hermeticity::Hermetic,
        Some(false) => Hermeticity::NonHermetic,
        None => infer_hermeticity(&parser, &statements_of(&draft_kind), &capture.referenced),
    };

    Ok(ActionDraft {
        file_name: def.path.clone(),
        identity,
        dependencies,
        tags: common.tags,
        disabled: common.disabled,
        description: common.description,
        hermeticity,
        kind: draft_kind,
    })
}

/// Resolve the `dependencies` list of a config block to canonical targets.
///
/// Unknown names resolve to a placeholder that the graph builder reports.
fn config_dependencies(declared: &[String], names: &NameTable) -> TemplateResult<Vec<Target>> {
    declared
        .iter()
        .map(|raw| {
            let reference = ActionRef::parse(raw).ok_or_else(|| TemplateError::InvalidReference {
                reference: raw.clone(),
            })?;
            match names.resolve(&reference) {
                Resolution::Found { canonical, .. } | Resolution::Missing { canonical, .. } => {
                    Ok(canonical)
                }
                Resolution::Ambiguous(candidates) => Err(TemplateError::AmbiguousReference {
                    reference: reference.to_string(),
                    candidates: candidates
                        .iter()
                        .map(Target::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
            }
        })
        .collect()
}

/// Render a table or assertion body, which must not be empty
fn render_query(
    env: &TemplateEnvironment<'_>,
    def: &DefinitionFile,
    kind: ActionKind,
) -> Result<String, FileError> {
    let query = env
        .render(&def.body)
        .map_err(|e| FileError::new(def.path.clone(), e))?;
    if query.is_empty() {
        return Err(FileError::new(
            def.path.clone(),
            CoreError::InvalidDefinition {
                path: def.path.clone(),
                message: format!("{} has an empty query", kind),
            },
        ));
    }
    Ok(query)
}

/// Render a template and split it into statements
fn render_statements(
    env: &TemplateEnvironment<'_>,
    template: Option<&str>,
) -> TemplateResult<Vec<String>> {
    match template {
        Some(t) => Ok(split_statements(&env.render(t)?)),
        None => Ok(Vec::new()),
    }
}

/// Split on lines consisting only of `---`
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    for line in sql.lines() {
        if line.trim() == "---" {
            statements.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    statements.push(current);
    statements
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn statements_of(kind: &DraftKind) -> Vec<&str> {
    match kind {
        DraftKind::Table {
            query,
            incremental_query,
            pre_ops,
            post_ops,
            ..
        } => pre_ops
            .iter()
            .chain(std::iter::once(query))
            .chain(incremental_query.iter())
            .chain(post_ops.iter())
            .map(String::as_str)
            .collect(),
        DraftKind::Assertion { query, .. } => vec![query.as_str()],
        DraftKind::Operation { queries, .. } => queries.iter().map(String::as_str).collect(),
        DraftKind::Declaration => Vec::new(),
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
