//! Read-oriented filesystem tools bound to a [`PathSandbox`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobBuilder;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use sidekick_tool::ToolRegistry;
use sidekick_types::{Tool, ToolContext, ToolDefinition, ToolError};

use crate::sandbox::PathSandbox;

/// Dependency, build, and VCS directories that file walks never enter.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "vendor",
    "__pycache__",
    ".git",
    ".hg",
    ".svn",
    ".venv",
    "venv",
];

/// Errors from filesystem tool execution.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Allow-list violation.
    #[error(transparent)]
    Denied(#[from] ToolError),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed search pattern.
    #[error("invalid glob pattern '{0}': {1}")]
    Pattern(String, String),
}

/// The filesystem tool group.
///
/// Holds the shared sandbox and registers one tool per operation. The
/// group is a tool source only when the allow-list is non-empty — callers
/// must check [`available`](FsToolset::available) before registering.
#[derive(Clone)]
pub struct FsToolset {
    sandbox: Arc<PathSandbox>,
}

impl FsToolset {
    /// Create the toolset over a shared sandbox.
    #[must_use]
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }

    /// Whether this toolset may act as a tool source.
    #[must_use]
    pub fn available(&self) -> bool {
        self.sandbox.is_available()
    }

    /// Register all filesystem tools into `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateName`] if another source already
    /// claimed one of the filesystem tool names.
    pub fn register_into(&self, registry: &mut ToolRegistry) -> Result<(), ToolError> {
        registry.register(ReadFileTool { sandbox: Arc::clone(&self.sandbox) })?;
        registry.register(ListDirectoryTool { sandbox: Arc::clone(&self.sandbox) })?;
        registry.register(SearchFilesTool { sandbox: Arc::clone(&self.sandbox) })?;
        registry.register(FileInfoTool { sandbox: Arc::clone(&self.sandbox) })?;
        registry.register(ListAllowedDirectoriesTool { sandbox: Arc::clone(&self.sandbox) })?;
        Ok(())
    }

    /// The names this toolset registers, in registration order.
    #[must_use]
    pub fn tool_names() -> Vec<String> {
        vec![
            ReadFileTool::NAME.to_string(),
            ListDirectoryTool::NAME.to_string(),
            SearchFilesTool::NAME.to_string(),
            FileInfoTool::NAME.to_string(),
            ListAllowedDirectoriesTool::NAME.to_string(),
        ]
    }
}

fn schema_for<T: schemars::JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

// ---- read_file -------------------------------------------------------------

/// Arguments for [`ReadFileTool`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadFileArgs {
    /// Path of the file to read. Relative paths resolve against the first
    /// allowed directory.
    pub path: String,
}

/// Reads a UTF-8 text file inside the allow-list.
pub struct ReadFileTool {
    sandbox: Arc<PathSandbox>,
}

impl Tool for ReadFileTool {
    const NAME: &'static str = "read_file";
    type Args = ReadFileArgs;
    type Output = String;
    type Error = FsError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "Read the contents of a text file inside the allowed directories".into(),
            input_schema: schema_for::<ReadFileArgs>(),
        }
    }

    async fn call(&self, args: ReadFileArgs, _ctx: &ToolContext) -> Result<String, FsError> {
        let path = self.sandbox.resolve(Path::new(&args.path))?;
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

// ---- list_directory --------------------------------------------------------

/// Arguments for [`ListDirectoryTool`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDirectoryArgs {
    /// Directory to list. Relative paths resolve against the first
    /// allowed directory.
    pub path: String,
}

/// Lists a directory inside the allow-list; directories carry a `/` suffix.
pub struct ListDirectoryTool {
    sandbox: Arc<PathSandbox>,
}

impl Tool for ListDirectoryTool {
    const NAME: &'static str = "list_directory";
    type Args = ListDirectoryArgs;
    type Output = Vec<String>;
    type Error = FsError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "List the entries of a directory inside the allowed directories".into(),
            input_schema: schema_for::<ListDirectoryArgs>(),
        }
    }

    async fn call(&self, args: ListDirectoryArgs, _ctx: &ToolContext) -> Result<Vec<String>, FsError> {
        let path = self.sandbox.resolve(Path::new(&args.path))?;
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                entries.push(format!("{name}/"));
            } else {
                entries.push(name);
            }
        }
        entries.sort();
        Ok(entries)
    }
}

// ---- search_files ----------------------------------------------------------

/// Arguments for [`SearchFilesTool`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFilesArgs {
    /// Glob pattern matched against file names (e.g. `*.rs`, `Makefile`).
    pub pattern: String,
    /// Optional directory to search under. When absent, every allowed
    /// root is searched and each match is qualified by its root.
    pub base_dir: Option<String>,
}

/// A single search hit, qualified by the allowed root it came from.
#[derive(Debug, Serialize)]
pub struct SearchMatch {
    /// The allowed root the walk started from.
    pub root: String,
    /// Absolute path of the matching file.
    pub path: String,
}

/// Glob search across the allow-list.
pub struct SearchFilesTool {
    sandbox: Arc<PathSandbox>,
}

impl SearchFilesTool {
    fn search_root(
        root: &Path,
        matcher: &globset::GlobMatcher,
        out: &mut Vec<SearchMatch>,
    ) {
        let mut builder = WalkBuilder::new(root);
        builder.hidden(false).git_ignore(true).git_global(false).git_exclude(false);
        builder.filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !EXCLUDED_DIRS.contains(&name))
        });

        for result in builder.build() {
            let Ok(entry) = result else { continue };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let name_hit = path
                .file_name()
                .is_some_and(|name| matcher.is_match(Path::new(name)));
            let rel_hit = path
                .strip_prefix(root)
                .is_ok_and(|rel| matcher.is_match(rel));
            if name_hit || rel_hit {
                out.push(SearchMatch {
                    root: root.display().to_string(),
                    path: path.display().to_string(),
                });
            }
        }
    }
}

impl Tool for SearchFilesTool {
    const NAME: &'static str = "search_files";
    type Args = SearchFilesArgs;
    type Output = Vec<SearchMatch>;
    type Error = FsError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "Search the allowed directories for files whose name matches a glob \
                          pattern"
                .into(),
            input_schema: schema_for::<SearchFilesArgs>(),
        }
    }

    async fn call(&self, args: SearchFilesArgs, _ctx: &ToolContext) -> Result<Vec<SearchMatch>, FsError> {
        let matcher = GlobBuilder::new(&args.pattern)
            .literal_separator(false)
            .build()
            .map_err(|e| FsError::Pattern(args.pattern.clone(), e.to_string()))?
            .compile_matcher();

        let bases: Vec<PathBuf> = match &args.base_dir {
            Some(base) => vec![self.sandbox.resolve(Path::new(base))?],
            None => self.sandbox.roots().to_vec(),
        };

        let mut matches = Vec::new();
        for base in &bases {
            Self::search_root(base, &matcher, &mut matches);
        }
        matches.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(pattern = %args.pattern, matches = matches.len(), "file search");
        Ok(matches)
    }
}

// ---- file_info -------------------------------------------------------------

/// Arguments for [`FileInfoTool`].
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FileInfoArgs {
    /// Path to inspect.
    pub path: String,
}

/// Metadata summary for a file or directory.
#[derive(Debug, Serialize)]
pub struct FileInfo {
    /// Normalized absolute path.
    pub path: String,
    /// `file` or `directory`.
    pub kind: String,
    /// Size in bytes (0 for directories).
    pub size_bytes: u64,
    /// Last-modified time, RFC 3339, when the platform reports one.
    pub modified: Option<String>,
}

/// Stat-style metadata for a sandboxed path.
pub struct FileInfoTool {
    sandbox: Arc<PathSandbox>,
}

impl Tool for FileInfoTool {
    const NAME: &'static str = "file_info";
    type Args = FileInfoArgs;
    type Output = FileInfo;
    type Error = FsError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "Get size, kind, and modification time for a path inside the allowed \
                          directories"
                .into(),
            input_schema: schema_for::<FileInfoArgs>(),
        }
    }

    async fn call(&self, args: FileInfoArgs, _ctx: &ToolContext) -> Result<FileInfo, FsError> {
        let path = self.sandbox.resolve(Path::new(&args.path))?;
        let meta = tokio::fs::metadata(&path).await?;
        let modified = meta
            .modified()
            .ok()
            .map(|time| chrono::DateTime::<chrono::Utc>::from(time).to_rfc3339());
        Ok(FileInfo {
            path: path.display().to_string(),
            kind: if meta.is_dir() { "directory".into() } else { "file".into() },
            size_bytes: if meta.is_dir() { 0 } else { meta.len() },
            modified,
        })
    }
}

// ---- list_allowed_directories ----------------------------------------------

/// Arguments for [`ListAllowedDirectoriesTool`] (none).
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListAllowedDirectoriesArgs {}

/// Summary of one allowed root.
#[derive(Debug, Serialize)]
pub struct AllowedDirectory {
    /// The allowed root path.
    pub path: String,
    /// Whether the directory currently exists.
    pub exists: bool,
    /// Number of direct entries (0 when missing).
    pub entry_count: usize,
}

/// Reports the configured allow-list back to the model.
pub struct ListAllowedDirectoriesTool {
    sandbox: Arc<PathSandbox>,
}

impl Tool for ListAllowedDirectoriesTool {
    const NAME: &'static str = "list_allowed_directories";
    type Args = ListAllowedDirectoriesArgs;
    type Output = Vec<AllowedDirectory>;
    type Error = FsError;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.into(),
            description: "List the code repository directories this agent is allowed to read".into(),
            input_schema: schema_for::<ListAllowedDirectoriesArgs>(),
        }
    }

    async fn call(
        &self,
        _args: ListAllowedDirectoriesArgs,
        _ctx: &ToolContext,
    ) -> Result<Vec<AllowedDirectory>, FsError> {
        let mut summaries = Vec::new();
        for root in self.sandbox.roots() {
            let mut entry_count = 0;
            let exists = match tokio::fs::read_dir(root).await {
                Ok(mut dir) => {
                    while dir.next_entry().await?.is_some() {
                        entry_count += 1;
                    }
                    true
                }
                Err(_) => false,
            };
            summaries.push(AllowedDirectory {
                path: root.display().to_string(),
                exists,
                entry_count,
            });
        }
        Ok(summaries)
    }
}
