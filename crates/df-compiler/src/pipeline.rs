//! Concurrent compile pipeline

use crate::error::{CompileError, CompileResult};
use crate::render::{compile_definition, declared_identity};
use df_assert::AssertionSynthesizer;
use df_core::{
    ActionDraft, ActionKind, CompiledGraph, CoreError, DefinitionFile, FileError, FileWarning,
    GraphBuilder, NameTable, Project, SettingsOverrides,
};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Compile tuning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum number of files processed at once
    pub concurrency: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
        }
    }
}

/// Compiles a loaded project into a [`CompiledGraph`]
#[derive(Debug)]
pub struct Compiler {
    project: Arc<Project>,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(project: Project, options: CompileOptions) -> Self {
        Self {
            project: Arc::new(project),
            options,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Run both compile phases and build the graph.
    ///
    /// Dropping the returned future aborts in-flight file tasks.
    pub async fn compile(&self) -> CompileResult<CompiledGraph> {
        let config = &self.project.config;
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));

        let mut file_errors = Vec::new();
        let mut file_warnings = Vec::new();

        let mut definitions = Vec::new();
        for loaded in self.load_definitions(&semaphore).await? {
            match loaded {
                Ok(def) => definitions.push(def),
                Err(e) => file_errors.push(e),
            }
        }

        let mut names = NameTable::new(config);
        for def in &definitions {
            let kind = def.config.action_kind();
            names.insert(kind, config.canonical_target(kind, &declared_identity(def)));
            for warning in &def.warnings {
                file_warnings.push(FileWarning::new(def.path.clone(), warning));
            }
            if kind == ActionKind::Declaration && !def.body.is_empty() {
                file_warnings.push(FileWarning::new(
                    def.path.clone(),
                    "Declarations have no query; the file body was ignored",
                ));
            }
        }
        log::debug!("Declared {} actions", names.len());

        let mut drafts: Vec<ActionDraft> = Vec::new();
        for rendered in self
            .render_definitions(definitions, Arc::new(names), &semaphore)
            .await?
        {
            match rendered {
                Ok(draft) => drafts.push(draft),
                Err(e) => file_errors.push(e),
            }
        }

        let synthesized = AssertionSynthesizer::new(config).synthesize_all(&drafts);
        drafts.extend(synthesized.drafts);
        file_errors.extend(synthesized.errors);

        Ok(GraphBuilder::new(config).build(drafts, file_errors, file_warnings))
    }

    /// Phase 1: read and split every definition file
    async fn load_definitions(
        &self,
        semaphore: &Arc<Semaphore>,
    ) -> CompileResult<Vec<Result<DefinitionFile, FileError>>> {
        let mut tasks = JoinSet::new();
        for (index, relative) in self.project.definition_paths.iter().enumerate() {
            let path = self.project.definition_path(relative);
            let relative = relative.clone();
            let semaphore = Arc::clone(semaphore);
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => read_definition(&path, &relative).await,
                    Err(_) => Err(FileError::new(relative, "compile cancelled")),
                };
                (index, result)
            });
        }
        join_in_order(tasks, self.project.definition_count()).await
    }

    /// Phase 2: render every definition against the complete name table
    async fn render_definitions(
        &self,
        definitions: Vec<DefinitionFile>,
        names: Arc<NameTable>,
        semaphore: &Arc<Semaphore>,
    ) -> CompileResult<Vec<Result<ActionDraft, FileError>>> {
        let count = definitions.len();
        let mut tasks = JoinSet::new();
        for (index, def) in definitions.into_iter().enumerate() {
            let permit = Arc::clone(semaphore)
                .acquire_owned()
                .await
                .map_err(|e| CompileError::TaskFailed(e.to_string()))?;
            let names = Arc::clone(&names);
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, compile_definition(&def, names))
            });
        }
        join_in_order(tasks, count).await
    }
}

async fn read_definition(path: &Path, relative: &str) -> Result<DefinitionFile, FileError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|source| {
        FileError::new(
            relative,
            CoreError::IoWithPath {
                path: relative.to_string(),
                source,
            },
        )
    })?;
    DefinitionFile::parse(relative, &content).map_err(|e| FileError::new(relative, e))
}

/// Wait for every task and return the results in spawn order
async fn join_in_order<T: Send + 'static>(
    mut tasks: JoinSet<(usize, T)>,
    count: usize,
) -> CompileResult<Vec<T>> {
    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, value) = joined.map_err(|e| CompileError::TaskFailed(e.to_string()))?;
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(value);
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

/// Load the project at `path` and compile it
pub async fn compile_project(
    path: &Path,
    overrides: &SettingsOverrides,
    options: CompileOptions,
) -> CompileResult<CompiledGraph> {
    let project = Project::load(path, overrides)?;
    log::debug!(
        "Compiling {} definition files under {}",
        project.definition_count(),
        project.root.display()
    );
    Compiler::new(project, options).compile().await
}
