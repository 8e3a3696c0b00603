//! df-core - Core library for dagform
//!
//! This crate provides project settings resolution, the action model,
//! definition file loading, the dependency DAG, compiled-graph building, and
//! run-time action selection used across all dagform components.

pub mod action;
pub mod action_config;
pub mod dag;
pub mod definition;
pub mod draft;
pub mod error;
pub mod graph;
pub mod project;
pub mod reference;
pub mod selector;
pub(crate) mod serde_helpers;
pub mod settings;
pub mod target;
pub mod warehouse;

pub use action::{
    Action, ActionKind, ActionMeta, Assertion, Declaration, GraphAction, Hermeticity, Operation,
    Table, TableEnumType, TableType,
};
pub use action_config::{ActionConfig, AssertionSpecs, CommonConfig};
pub use dag::ActionDag;
pub use definition::DefinitionFile;
pub use draft::{ActionDraft, DraftKind, FileError, FileWarning};
pub use error::{CoreError, CoreResult};
pub use graph::{CompiledGraph, GraphBuilder};
pub use project::Project;
pub use reference::{ActionRef, NameTable, Resolution};
pub use selector::{select_actions, RunConfig};
pub use settings::{ProjectConfig, SettingsOverrides, StorageConfig};
pub use target::{ActionIdentity, Target};
pub use warehouse::Warehouse;
