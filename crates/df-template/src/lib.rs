//! df-template - template layer for dagform
//!
//! Definition bodies are minijinja templates with `${ ... }` interpolation
//! and `{% ... %}` blocks. The global set is closed: `vars`, `ref()`,
//! `resolve()`, `self()`, `name()`, `incremental()`, and `when()`. Any other
//! identifier fails the render.

pub mod context;
pub mod environment;
pub mod error;
pub mod functions;

pub use context::{ActionContext, RenderCapture};
pub use environment::TemplateEnvironment;
pub use error::{TemplateError, TemplateResult};
