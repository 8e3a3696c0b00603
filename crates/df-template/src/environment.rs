//! Template environment setup

use crate::context::{lock, ActionContext, RenderCapture, SharedCapture};
use crate::error::{TemplateError, TemplateResult};
use crate::functions::{make_incremental_fn, make_name_fn, make_ref_fn, make_self_fn, when_fn};
use df_core::NameTable;
use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Template environment for a single action
pub struct TemplateEnvironment<'a> {
    env: Environment<'a>,
    capture: SharedCapture,
    incremental: Arc<AtomicBool>,
}

impl<'a> TemplateEnvironment<'a> {
    /// Create an environment that resolves references against `names`.
    pub fn new(names: Arc<NameTable>, action: ActionContext) -> TemplateResult<Self> {
        let mut env = Environment::new();
        let syntax = SyntaxConfig::builder()
            .block_delimiters("{%", "%}")
            .variable_delimiters("${", "}")
            .comment_delimiters("{#", "#}")
            .build()
            .map_err(|e| TemplateError::Internal(e.to_string()))?;
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let capture: SharedCapture = Arc::new(Mutex::new(RenderCapture::default()));
        let incremental = Arc::new(AtomicBool::new(false));

        env.add_global("vars", Value::from_serialize(&names.config().vars));
        env.add_function("ref", make_ref_fn(names.clone(), capture.clone(), true));
        env.add_function("resolve", make_ref_fn(names.clone(), capture.clone(), false));
        env.add_function("self", make_self_fn(names, action.clone(), capture.clone()));
        env.add_function("name", make_name_fn(action.name));
        env.add_function("incremental", make_incremental_fn(incremental.clone()));
        env.add_function("when", when_fn);

        Ok(Self {
            env,
            capture,
            incremental,
        })
    }

    /// Render a template with `incremental()` false. Output is trimmed.
    pub fn render(&self, template: &str) -> TemplateResult<String> {
        self.render_with(template, false)
    }

    /// Render a template with `incremental()` true
    pub fn render_incremental(&self, template: &str) -> TemplateResult<String> {
        self.render_with(template, true)
    }

    fn render_with(&self, template: &str, incremental: bool) -> TemplateResult<String> {
        self.incremental.store(incremental, Ordering::SeqCst);
        let result = self.env.render_str(template, ());
        self.incremental.store(false, Ordering::SeqCst);

        match result {
            Ok(rendered) => Ok(rendered.trim().to_string()),
            Err(err) => match lock(&self.capture).error.take() {
                Some(typed) => Err(typed),
                None => Err(TemplateError::from(err)),
            },
        }
    }

    /// Everything captured by the renders so far
    pub fn capture(&self) -> RenderCapture {
        lock(&self.capture).clone()
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
