//! Error types for df-core

use thiserror::Error;

/// Core error type for dagform
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: No settings file found in the project directory
    #[error("[E001] No project settings found: expected {path}")]
    SettingsNotFound { path: String },

    /// E002: Failed to parse a settings or manifest file
    #[error("[E002] Failed to parse {path}: {message}")]
    SettingsParseError { path: String, message: String },

    /// E003: Invalid settings value
    #[error("[E003] Invalid settings: {message}")]
    SettingsInvalid { message: String },

    /// E004: Project directory not found
    #[error("[E004] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E005: Package manifest present alongside a pinned core version
    #[error("[E005] '{path}' must not exist when coreVersion {version} is pinned in the project settings. Package installation is stateless and lazy; it happens when compile is called. Remove '{path}'")]
    PinnedVersionConflict { path: String, version: String },

    /// E006: Neither a pinned core version nor a declared core dependency
    #[error("[E006] No core version found: set `coreVersion` in workflow_settings.yaml, or declare '{package}' in the dependencies of {manifest}")]
    MissingCoreDependency { package: String, manifest: String },

    /// E007: Declared core dependency is not installed
    #[error("[E007] '{package}' {requirement} is declared in packages.json but is not installed: expected {path}. Install project packages before compiling")]
    CoreNotInstalled {
        package: String,
        requirement: String,
        path: String,
    },

    /// E008: Installed core dependency does not satisfy the declared requirement
    #[error("[E008] Installed '{package}' {installed} does not satisfy the declared requirement {requirement}. Reinstall project packages")]
    CoreVersionMismatch {
        package: String,
        requirement: String,
        installed: String,
    },

    /// E009: Circular dependency detected
    #[error("[E009] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E010: Two actions share a canonical target
    #[error("[E010] Duplicate action target '{target}' defined in {files}")]
    DuplicateTarget { target: String, files: String },

    /// E011: Dependency does not resolve to an action in the project
    #[error("[E011] Action '{action}' depends on '{dependency}', which is not defined in this project")]
    UnresolvedDependency { action: String, dependency: String },

    /// E012: An explicitly selected action does not exist
    #[error("[E012] Action not found: '{name}'")]
    ActionNotFound { name: String },

    /// E012: An explicitly selected name matches only declarations
    #[error("[E012] Action '{name}' is a declaration; declarations cannot be run")]
    DeclarationNotRunnable { name: String },

    /// E013: Malformed or unterminated block in a definition file
    #[error("[E013] Invalid definition file {path}: {message}")]
    InvalidDefinition { path: String, message: String },

    /// E014: Config block declares an unknown action type
    #[error("[E014] Unknown action type '{found}' in {path}. Valid types: table, view, incremental, assertion, operations, declaration")]
    UnknownActionType { path: String, found: String },

    /// E015: Config block fields have the wrong shape
    #[error("[E015] Invalid config block in {path}: {message}")]
    InvalidConfigBlock { path: String, message: String },

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E017: Malformed command-line override
    #[error("[E017] Invalid value for {flag}: {message}")]
    InvalidOverride { flag: String, message: String },

    /// E018: IO error
    #[error("[E018] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
