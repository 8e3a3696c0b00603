//! Template functions: ref(), resolve(), self(), name(), incremental(),
//! and when().

use crate::context::{lock, ActionContext, SharedCapture};
use crate::error::TemplateError;
use df_core::{ActionRef, NameTable, Resolution, Target};
use minijinja::value::{Rest, Value};
use minijinja::{Error, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create `ref()` (registers a dependency) or `resolve()` (does not).
///
/// Usage in templates:
/// ```text
/// select * from ${ref("orders")}
/// select * from ${ref("staging", "orders")}
/// select * from ${resolve("raw", "events")}
/// ```
///
/// Unknown names render a placeholder built from the project defaults and
/// still register the dependency, so the graph builder can report it.
pub(crate) fn make_ref_fn(
    names: Arc<NameTable>,
    capture: SharedCapture,
    register_dependency: bool,
) -> impl Fn(Rest<String>) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |args: Rest<String>| {
        let function = if register_dependency { "ref" } else { "resolve" };
        let Some(reference) = ActionRef::from_parts(args.as_slice()) else {
            let reference = args.join(".");
            lock(&capture).error = Some(TemplateError::InvalidReference {
                reference: reference.clone(),
            });
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("{}() takes 1 to 3 non-empty arguments, got '{}'", function, reference),
            ));
        };

        let (canonical, runtime) = match names.resolve(&reference) {
            Resolution::Found { canonical, runtime } => (canonical, runtime),
            Resolution::Missing { canonical, runtime } => {
                log::debug!("{}('{}') does not match any action", function, reference);
                (canonical, runtime)
            }
            Resolution::Ambiguous(candidates) => {
                let candidates = candidates
                    .iter()
                    .map(Target::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                lock(&capture).error = Some(TemplateError::AmbiguousReference {
                    reference: reference.to_string(),
                    candidates: candidates.clone(),
                });
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("ambiguous reference '{}'", reference),
                ));
            }
        };

        let rendered = names.config().warehouse().quote_target(&runtime);
        let mut captured = lock(&capture);
        if register_dependency {
            captured.dependencies.insert(canonical);
        }
        captured.referenced.insert(runtime);
        Ok(rendered)
    }
}

/// Create `self()`, which renders the current action's runtime target
pub(crate) fn make_self_fn(
    names: Arc<NameTable>,
    action: ActionContext,
    capture: SharedCapture,
) -> impl Fn() -> String + Send + Sync + Clone + 'static {
    move || {
        lock(&capture).referenced.insert(action.target.clone());
        names.config().warehouse().quote_target(&action.target)
    }
}

/// Create `name()`, which returns the current action's name
pub(crate) fn make_name_fn(name: String) -> impl Fn() -> String + Send + Sync + Clone + 'static {
    let shared: Arc<str> = name.into();
    move || shared.to_string()
}

/// Create `incremental()`, true only while rendering an incremental query
///
/// ```text
/// ${when(incremental(), "where ts > (select max(ts) from " + self() + ")")}
/// ```
pub(crate) fn make_incremental_fn(
    flag: Arc<AtomicBool>,
) -> impl Fn() -> bool + Send + Sync + Clone + 'static {
    move || flag.load(Ordering::SeqCst)
}

/// `when(cond, then, otherwise="")`
pub(crate) fn when_fn(cond: Value, then: Value, otherwise: Option<Value>) -> Value {
    if cond.is_true() {
        then
    } else {
        otherwise.unwrap_or_else(|| Value::from(""))
    }
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
