//! Registry tools exposing the exploration engine to the model.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use sidekick_tool::ToolRegistry;
use sidekick_types::{Tool, ToolContext, ToolDefinition, ToolError};

use crate::engine::{ExplorationEngine, ExploreError};
use crate::relevance::ScoredFile;

/// Default result count for `find_relevant_files`.
const DEFAULT_MAX_RESULTS: usize = 10;

/// The exploration tool group: `project_overview` and
/// `find_relevant_files`, sharing one engine.
#[derive(Clone)]
pub struct ExplorationToolset {
    engine: Arc<ExplorationEngine>,
}

impl ExplorationToolset {
    /// Create the toolset over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<ExplorationEngine>) -> Self {
        Self { engine }
    }

    /// Whether this toolset may act as a tool source — requires at least
    /// one allowed repository root.
    #[must_use]
    pub fn available(&self) -> bool {
        self.engine.sandbox().is_available()
    }

    /// Register both exploration tools into `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateName`] if another source already
    /// claimed one of the exploration tool names.
    pub fn register_into(&self, registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register(ProjectOverviewTool { engine: Arc::clone(&self.engine) })?;
        registry.register(FindRelevantFilesTool { engine: Arc::clone(&self.engine) })?;
        Ok(())
    }

    /// The names this toolset registers, in registration order.
    #[must_use]
    pub fn tool_names() -> Vec<String> {
        vec![
            ProjectOverviewTool::NAME.to_string(),
            FindRelevantFilesTool::NAME.to_string(),
        ]
    }
}

fn schema_for<T: schemars::JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// Pick the repo root: an explicit path or the first allowed root.
fn default_root(engine: &ExplorationEngine, path: Option<&str>) -> Result<PathBuf, ExploreError> {
    match path {
        Some(path) => Ok(PathBuf::from(path)),
        None => engine
            .sandbox()
            .roots()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::AccessDenied("<no allowed directories>".into()).into()),
    }
}

// ---- project_overview ------------------------------------------------------

/// Arguments for [`ProjectOverviewTool`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProjectOverviewArgs {
    /// Repository root to explore. Defaults to the first allowed directory.
    pub path: Option<String>,
    /// Override for the maximum number of files read.
    pub max_files: Option<usize>,
}

/// Bounded repository overview via anchor-file reading.
pub struct ProjectOverviewTool {
    engine: Arc<ExplorationEngine>,
}

impl Tool for ProjectOverviewTool {
    const NAME: &'static str = "project_overview";
    type Args = ProjectOverviewArgs;
    type Output = String;
    type Error = ExploreError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "Get a bounded overview of a code repository: key documentation, build \
                          targets, services, and entry points, from a small fixed number of file \
                          reads"
                .into(),
            input_schema: schema_for::<ProjectOverviewArgs>(),
        }
    }

    async fn call(&self, args: ProjectOverviewArgs, _ctx: &ToolContext) -> Result<String, ExploreError> {
        let root = default_root(&self.engine, args.path.as_deref())?;
        let context = self.engine.project_overview(&root, args.max_files).await?;
        Ok(context.render())
    }
}

// ---- find_relevant_files ---------------------------------------------------

/// Arguments for [`FindRelevantFilesTool`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindRelevantFilesArgs {
    /// Free-text question or topic to match files against.
    pub query: String,
    /// Repository root to search. Defaults to the first allowed directory.
    pub path: Option<String>,
    /// Maximum number of results (default 10).
    pub max_results: Option<usize>,
}

/// Keyword-heuristic file ranking. Re-runs per query; no caching.
pub struct FindRelevantFilesTool {
    engine: Arc<ExplorationEngine>,
}

impl Tool for FindRelevantFilesTool {
    const NAME: &'static str = "find_relevant_files";
    type Args = FindRelevantFilesArgs;
    type Output = Vec<ScoredFile>;
    type Error = ExploreError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "Rank repository files by relevance to a question, with an explanation \
                          of each score"
                .into(),
            input_schema: schema_for::<FindRelevantFilesArgs>(),
        }
    }

    async fn call(
        &self,
        args: FindRelevantFilesArgs,
        _ctx: &ToolContext,
    ) -> Result<Vec<ScoredFile>, ExploreError> {
        let root = default_root(&self.engine, args.path.as_deref())?;
        let max_results = args.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        self.engine.relevant_files(&args.query, &root, None, max_results)
    }
}
