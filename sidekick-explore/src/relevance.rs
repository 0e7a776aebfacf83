//! Keyword-heuristic file ranking for "where is X?" questions.
//!
//! This is a heuristic ranker, not a search index: candidates are files
//! whose name contains a query keyword, scored by a handful of additive
//! signals, re-run per query with no caching.

use std::collections::HashSet;
use std::path::{Component, Path};

use ignore::WalkBuilder;

use crate::engine::ExplorationContext;

/// Query tokens that carry no signal on their own.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "this", "that", "what", "where", "which", "how", "does",
    "can", "you", "use", "using", "with", "from", "into", "about", "find", "show", "all", "any",
    "file", "files", "code",
];

/// Extensions that make a file a scoring candidate.
const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "py", "go", "java", "rb", "c", "cc", "cpp", "h",
    "hpp", "cs", "php", "swift", "kt", "scala", "md", "json", "yaml", "yml", "toml",
];

/// Extensions that get the small source-code bonus.
const CODE_EXTENSIONS: &[&str] =
    &["rs", "ts", "tsx", "js", "jsx", "mjs", "py", "go", "java", "rb", "kt", "swift", "scala"];

/// Dependency directories that are effectively excluded from results.
const DEPENDENCY_DIRS: &[&str] = &["node_modules", "vendor", ".venv", "venv", "__pycache__"];
/// Build-output directories, heavily penalized.
const BUILD_DIRS: &[&str] = &["dist", "build", "target", "out"];

// Scoring weights.
const KEYWORD_IN_PATH: i32 = 10;
const MENTIONED_IN_OVERVIEW: i32 = 15;
const ENTRY_POINT_MATCH: i32 = 20;
const CODE_EXTENSION_BONUS: i32 = 5;
const TEST_PATH_PENALTY: i32 = -10;
const DEPENDENCY_DIR_PENALTY: i32 = -100;
const BUILD_DIR_PENALTY: i32 = -50;
const DEPTH_PENALTY_PER_LEVEL: i32 = -1;

/// A ranked candidate with the signals that produced its score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoredFile {
    /// Repo-relative path.
    pub path: String,
    /// Total additive score.
    pub score: i32,
    /// Human-readable explanation of each contributing signal.
    pub reasons: Vec<String>,
}

/// Extract scoring keywords from a free-text query: lowercased,
/// punctuation stripped, stop-words and tokens of two characters or fewer
/// dropped, order-preserving dedup.
#[must_use]
pub fn extract_keywords(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut seen = HashSet::new();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 2 && !STOP_WORDS.contains(token))
        .filter(|token| seen.insert((*token).to_string()))
        .map(str::to_string)
        .collect()
}

/// Rank files under `root` by relevance to `query`.
///
/// Returns the top `max_results` by score descending; ties break by path
/// so repeated calls are deterministic.
#[must_use]
pub fn find_relevant_files(
    query: &str,
    root: &Path,
    context: Option<&ExplorationContext>,
    max_results: usize,
) -> Vec<ScoredFile> {
    let keywords = extract_keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredFile> = Vec::new();

    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_name(std::ffi::OsStr::cmp);
    // Dependency and build directories stay in the walk on purpose (the
    // scorer penalizes them into oblivion); VCS internals never matter.
    walker.filter_entry(|entry| {
        entry
            .file_name()
            .to_str()
            .is_none_or(|name| !matches!(name, ".git" | ".hg" | ".svn"))
    });

    for result in walker.build() {
        let Ok(entry) = result else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(root) else { continue };

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !SOURCE_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_lowercase();
        if !keywords.iter().any(|kw| file_name.contains(kw.as_str())) {
            continue;
        }

        if let Some(candidate) = score_candidate(rel, &extension, &keywords, context) {
            scored.push(candidate);
        }
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.path.cmp(&b.path)));
    scored.truncate(max_results);
    scored
}

/// Score one candidate; `None` only for paths that fail to render.
fn score_candidate(
    rel: &Path,
    extension: &str,
    keywords: &[String],
    context: Option<&ExplorationContext>,
) -> Option<ScoredFile> {
    let rel_str = rel.to_str()?.to_string();
    let rel_lower = rel_str.to_lowercase();
    let file_name = rel.file_name()?.to_str()?.to_lowercase();

    let mut score = 0;
    let mut reasons = Vec::new();

    for keyword in keywords {
        if rel_lower.contains(keyword.as_str()) {
            score += KEYWORD_IN_PATH;
            reasons.push(format!("keyword '{keyword}' in path (+{KEYWORD_IN_PATH})"));
        }
    }

    if let Some(ctx) = context {
        if ctx.overview.contains(&rel_str) {
            score += MENTIONED_IN_OVERVIEW;
            reasons.push(format!("mentioned in project overview (+{MENTIONED_IN_OVERVIEW})"));
        }
        let is_entry = ctx.entry_points.iter().any(|entry| {
            entry == &rel_str || entry.ends_with(&file_name) || rel_str.ends_with(entry.as_str())
        });
        if is_entry {
            score += ENTRY_POINT_MATCH;
            reasons.push(format!("matches a discovered entry point (+{ENTRY_POINT_MATCH})"));
        }
    }

    if CODE_EXTENSIONS.contains(&extension) {
        score += CODE_EXTENSION_BONUS;
        reasons.push(format!("source extension .{extension} (+{CODE_EXTENSION_BONUS})"));
    }

    if rel_lower.contains("test") || rel_lower.contains(".spec.") || rel_lower.contains("_spec") {
        score += TEST_PATH_PENALTY;
        reasons.push(format!("test/spec path ({TEST_PATH_PENALTY})"));
    }

    let components: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    if components.iter().any(|part| DEPENDENCY_DIRS.contains(part)) {
        score += DEPENDENCY_DIR_PENALTY;
        reasons.push(format!("dependency directory ({DEPENDENCY_DIR_PENALTY})"));
    }
    if components.iter().any(|part| BUILD_DIRS.contains(part)) {
        score += BUILD_DIR_PENALTY;
        reasons.push(format!("build output directory ({BUILD_DIR_PENALTY})"));
    }

    let depth = components.len().saturating_sub(1) as i32;
    if depth > 0 {
        score += DEPTH_PENALTY_PER_LEVEL * depth;
        reasons.push(format!(
            "{depth} directories deep ({})",
            DEPTH_PENALTY_PER_LEVEL * depth
        ));
    }

    Some(ScoredFile {
        path: rel_str,
        score,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn keywords_drop_stopwords_punctuation_and_short_tokens() {
        let keywords = extract_keywords("How does the Jira client send requests to v2 API?");
        assert_eq!(keywords, vec!["jira", "client", "send", "requests", "api"]);
    }

    #[test]
    fn keywords_dedup_preserving_order() {
        assert_eq!(extract_keywords("client client jira client"), vec!["client", "jira"]);
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn jira_client_ranking_example() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/jira-client.ts");
        touch(dir.path(), "src/jira-client.test.ts");
        touch(dir.path(), "node_modules/jira-client/index.js");

        let results = find_relevant_files("jira client", dir.path(), None, 10);
        assert_eq!(results[0].path, "src/jira-client.ts");

        let test_file = results.iter().find(|r| r.path.contains(".test.")).unwrap();
        assert!(test_file.score < results[0].score);

        // The node_modules copy is either filtered or far below zero.
        if let Some(dep) = results.iter().find(|r| r.path.contains("node_modules")) {
            assert!(dep.score < 0);
        }
    }

    #[test]
    fn entry_point_and_overview_bonuses_apply() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "server.js");
        touch(dir.path(), "lib/server.js");

        let mut ctx = ExplorationContext {
            repo_root: dir.path().to_path_buf(),
            overview: "the entry is server.js".to_string(),
            entry_points: vec!["server.js".to_string()],
            services: vec![],
            key_files: vec![],
            files_read: 0,
            estimated_tokens: 0,
        };
        ctx.overview.push_str(" and nothing else");

        let results = find_relevant_files("server", dir.path(), Some(&ctx), 10);
        assert_eq!(results[0].path, "server.js");
        let top = &results[0];
        assert!(top.reasons.iter().any(|r| r.contains("entry point")));
        assert!(top.reasons.iter().any(|r| r.contains("overview")));
    }

    #[test]
    fn empty_query_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/thing.rs");
        assert!(find_relevant_files("the of and", dir.path(), None, 5).is_empty());
    }
}
