//! Per-action render context and captured side effects

use crate::error::TemplateError;
use df_core::Target;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// The action a template belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    /// Declared name, returned by `name()`
    pub name: String,
    /// Runtime target, rendered by `self()`
    pub target: Target,
}

/// What a render did besides producing text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCapture {
    /// Canonical targets registered by `ref()`
    pub dependencies: BTreeSet<Target>,
    /// Runtime targets rendered by `ref()`, `resolve()`, and `self()`
    pub referenced: BTreeSet<Target>,
    /// Typed error raised inside a template function
    pub error: Option<TemplateError>,
}

/// Shared capture, written by template functions during a render
pub(crate) type SharedCapture = Arc<Mutex<RenderCapture>>;

/// Lock a capture, recovering from a poisoned mutex
pub(crate) fn lock(capture: &SharedCapture) -> MutexGuard<'_, RenderCapture> {
    capture.lock().unwrap_or_else(|p| p.into_inner())
}
