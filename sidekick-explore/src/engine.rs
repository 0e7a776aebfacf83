//! The bounded "read anchor files → summarize" exploration pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sidekick_fs::PathSandbox;
use sidekick_types::ToolError;

use crate::anchors::{AnchorCategory, find_anchor_files};
use crate::compose::extract_services;
use crate::makefile::{extract_entry_points, parse_makefile, summarize};
use crate::manifest::{extract_path_aliases, summarize_cargo_toml, summarize_package_json};

/// Rough token estimate: four characters per token.
const CHARS_PER_TOKEN: usize = 4;

/// Knobs for one exploration pass.
#[derive(Debug, Clone)]
pub struct ExplorationOptions {
    /// Hard bound on the number of files read per overview.
    pub max_anchor_files: usize,
    /// Per-file size ceiling in bytes; larger files are skipped with a
    /// visible notice.
    pub max_file_size: u64,
    /// Excerpt cap for documentation files.
    pub doc_excerpt_chars: usize,
    /// Excerpt cap for code entry points.
    pub entry_excerpt_chars: usize,
    /// Excerpt cap for everything else.
    pub generic_excerpt_chars: usize,
}

impl Default for ExplorationOptions {
    fn default() -> Self {
        Self {
            max_anchor_files: 15,
            max_file_size: 50_000,
            doc_excerpt_chars: 10_000,
            entry_excerpt_chars: 5_000,
            generic_excerpt_chars: 3_000,
        }
    }
}

/// A captured key-file excerpt.
#[derive(Debug, Clone, serde::Serialize)]
pub struct KeyFile {
    /// Repo-relative path.
    pub path: String,
    /// Why the file was read.
    pub reason: String,
    /// `entry_point` or `key_file`.
    pub tag: String,
    /// Truncated file content.
    pub excerpt: String,
}

/// Accumulator for one exploration pass. Lives only for the duration of
/// one overview call; nothing is cached across turns.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExplorationContext {
    /// The explored repository root.
    pub repo_root: PathBuf,
    /// Free-text overview narrative.
    pub overview: String,
    /// Discovered entry points (declared or extracted from run targets).
    pub entry_points: Vec<String>,
    /// Service names discovered in compose files.
    pub services: Vec<String>,
    /// Key-file excerpts with reasons.
    pub key_files: Vec<KeyFile>,
    /// Number of files actually read.
    pub files_read: usize,
    /// Estimated token cost of the accumulated text.
    pub estimated_tokens: usize,
}

impl ExplorationContext {
    fn new(repo_root: PathBuf) -> Self {
        Self {
            repo_root,
            overview: String::new(),
            entry_points: Vec::new(),
            services: Vec::new(),
            key_files: Vec::new(),
            files_read: 0,
            estimated_tokens: 0,
        }
    }

    /// Render the context as the text returned to the model: a header with
    /// the repo path, files-read count, and token estimate, followed by the
    /// accumulated overview and structured hints.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            "# Project overview: {}\nFiles read: {} (~{} tokens)\n\n",
            self.repo_root.display(),
            self.files_read,
            self.estimated_tokens,
        );
        out.push_str(&self.overview);
        if !self.entry_points.is_empty() {
            out.push_str(&format!("\nEntry points: {}\n", self.entry_points.join(", ")));
        }
        if !self.services.is_empty() {
            out.push_str(&format!("\nServices: {}\n", self.services.join(", ")));
        }
        for key_file in &self.key_files {
            out.push_str(&format!(
                "\n## {} [{}] ({})\n{}\n",
                key_file.path, key_file.tag, key_file.reason, key_file.excerpt,
            ));
        }
        out
    }
}

/// Errors from exploration operations.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// Allow-list violation on the repo root.
    #[error(transparent)]
    Denied(#[from] ToolError),
    /// The given root is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Orchestrates anchor discovery and per-file-type processing.
///
/// Construction requires the shared sandbox — exploration never reads
/// outside the allow-list.
pub struct ExplorationEngine {
    sandbox: Arc<PathSandbox>,
    options: ExplorationOptions,
}

impl ExplorationEngine {
    /// Create an engine with default options.
    #[must_use]
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self::with_options(sandbox, ExplorationOptions::default())
    }

    /// Create an engine with explicit options.
    #[must_use]
    pub fn with_options(sandbox: Arc<PathSandbox>, options: ExplorationOptions) -> Self {
        Self { sandbox, options }
    }

    /// The sandbox this engine reads through.
    #[must_use]
    pub fn sandbox(&self) -> &Arc<PathSandbox> {
        &self.sandbox
    }

    /// Build a bounded overview of the repository at `repo_root`.
    ///
    /// Reads at most `max_anchor_files` files (the override wins over the
    /// engine default) regardless of repository size.
    ///
    /// # Errors
    ///
    /// Fails when the root is outside the allow-list or not a directory.
    /// Per-file read failures are noted in the overview, not fatal.
    pub async fn project_overview(
        &self,
        repo_root: &Path,
        max_files: Option<usize>,
    ) -> Result<ExplorationContext, ExploreError> {
        let root = self.sandbox.resolve(repo_root)?;
        if !tokio::fs::metadata(&root).await?.is_dir() {
            return Err(ExploreError::NotADirectory(root.display().to_string()));
        }

        let budget = max_files.unwrap_or(self.options.max_anchor_files);
        let anchors = find_anchor_files(&root);
        let mut ctx = ExplorationContext::new(root.clone());

        tracing::debug!(
            root = %root.display(),
            anchors = anchors.len(),
            budget,
            "starting exploration pass"
        );

        for anchor in anchors.into_iter().take(budget) {
            let rel = anchor
                .path
                .strip_prefix(&root)
                .unwrap_or(&anchor.path)
                .display()
                .to_string();

            let size = match tokio::fs::metadata(&anchor.path).await {
                Ok(meta) => meta.len(),
                Err(e) => {
                    ctx.overview.push_str(&format!("[could not stat {rel}: {e}]\n\n"));
                    continue;
                }
            };
            if size > self.options.max_file_size {
                ctx.overview.push_str(&format!(
                    "[skipped {rel}: {size} bytes exceeds the {} byte ceiling]\n\n",
                    self.options.max_file_size,
                ));
                continue;
            }

            let content = match tokio::fs::read_to_string(&anchor.path).await {
                Ok(content) => content,
                Err(e) => {
                    ctx.overview.push_str(&format!("[could not read {rel}: {e}]\n\n"));
                    continue;
                }
            };
            ctx.files_read += 1;

            self.process_anchor(&mut ctx, &rel, anchor.category, &anchor.reason, &content);
        }

        ctx.estimated_tokens = (ctx.overview.len()
            + ctx
                .key_files
                .iter()
                .map(|k| k.excerpt.len())
                .sum::<usize>())
            / CHARS_PER_TOKEN;
        Ok(ctx)
    }

    /// Category-specific processing for one anchor file.
    fn process_anchor(
        &self,
        ctx: &mut ExplorationContext,
        rel: &str,
        category: AnchorCategory,
        reason: &str,
        content: &str,
    ) {
        let file_name = Path::new(rel)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(rel);

        match file_name {
            name if name == "Makefile" || name == "makefile" || name == "justfile" => {
                let targets = parse_makefile(content);
                ctx.overview.push_str(&format!("## {rel}\n{}\n", summarize(&targets)));
                ctx.entry_points.extend(extract_entry_points(&targets));
            }
            "package.json" => {
                if let Some(summary) = summarize_package_json(content) {
                    ctx.overview.push_str(&format!("## {rel}\n{}\n", summary.render("package")));
                    if let Some(entry) = summary.entry_point {
                        ctx.entry_points.push(entry);
                    }
                } else {
                    ctx.overview.push_str(&format!("[{rel} did not parse as JSON]\n\n"));
                }
            }
            "Cargo.toml" => {
                if let Some(summary) = summarize_cargo_toml(content) {
                    ctx.overview.push_str(&format!("## {rel}\n{}\n", summary.render("crate")));
                    if let Some(entry) = summary.entry_point {
                        ctx.entry_points.push(entry);
                    }
                }
            }
            name if name.starts_with("docker-compose") || name.starts_with("compose.") => {
                let services = extract_services(content);
                if !services.is_empty() {
                    ctx.overview.push_str(&format!(
                        "## {rel}\nCompose services: {}\n\n",
                        services.join(", ")
                    ));
                    ctx.services.extend(services);
                }
            }
            name if name.starts_with("tsconfig") => {
                let aliases = extract_path_aliases(content);
                if !aliases.is_empty() {
                    let rendered: Vec<String> = aliases
                        .iter()
                        .map(|(alias, targets)| format!("{alias} -> {}", targets.join(", ")))
                        .collect();
                    ctx.overview.push_str(&format!(
                        "## {rel}\nPath aliases: {}\n\n",
                        rendered.join("; ")
                    ));
                }
            }
            _ => match category {
                AnchorCategory::Documentation => {
                    ctx.overview.push_str(&format!(
                        "## {rel}\n{}\n\n",
                        truncate(content, self.options.doc_excerpt_chars)
                    ));
                }
                AnchorCategory::CodeEntry => {
                    ctx.key_files.push(KeyFile {
                        path: rel.to_string(),
                        reason: reason.to_string(),
                        tag: "entry_point".to_string(),
                        excerpt: truncate(content, self.options.entry_excerpt_chars),
                    });
                }
                _ => {
                    ctx.key_files.push(KeyFile {
                        path: rel.to_string(),
                        reason: reason.to_string(),
                        tag: "key_file".to_string(),
                        excerpt: truncate(content, self.options.generic_excerpt_chars),
                    });
                }
            },
        }
    }

    /// Keyword-score candidate files for a query. Pure delegation to
    /// [`crate::relevance`], kept here so tools share one entry point.
    ///
    /// # Errors
    ///
    /// Fails when the root is outside the allow-list.
    pub fn relevant_files(
        &self,
        query: &str,
        repo_root: &Path,
        context: Option<&ExplorationContext>,
        max_results: usize,
    ) -> Result<Vec<crate::relevance::ScoredFile>, ExploreError> {
        let root = self.sandbox.resolve(repo_root)?;
        Ok(crate::relevance::find_relevant_files(query, &root, context, max_results))
    }
}

/// Truncate to a character cap without splitting a UTF-8 sequence.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_string();
    }
    let mut boundary = max_chars;
    while boundary > 0 && !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    format!("{}... [truncated, {} chars total]", &text[..boundary], text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = truncate(text, 3);
        assert!(cut.starts_with("hé") || cut.starts_with("h"));
        assert!(cut.contains("[truncated"));
    }

    #[test]
    fn truncate_is_identity_below_cap() {
        assert_eq!(truncate("short", 100), "short");
    }
}
