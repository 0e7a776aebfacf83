//! The anchor-file catalog and ranking.
//!
//! A fixed, hand-curated table of high-signal file patterns bootstraps
//! understanding of an unfamiliar repository with a small number of reads.
//! The catalog trades completeness for a high-signal set chosen by
//! convention rather than content inspection — this is the load-bearing
//! heuristic that keeps exploration bounded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use ignore::WalkBuilder;
use sidekick_fs::EXCLUDED_DIRS;
use sidekick_fs::sandbox::normalize;

/// What kind of signal an anchor file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorCategory {
    /// Project-overview prose (READMEs, architecture notes).
    Documentation,
    /// Build and dependency entry points (manifests, Makefiles).
    Entrypoint,
    /// Deployment and CI plumbing (compose files, Dockerfiles, workflows).
    Infrastructure,
    /// Tooling configuration (tsconfig and friends).
    Configuration,
    /// Per-language code entry points.
    CodeEntry,
    /// Anchor-matched but none of the above.
    Other,
}

/// One catalog row: a glob over repo-relative paths plus its rank.
struct AnchorSpec {
    pattern: &'static str,
    priority: i32,
    reason: &'static str,
    category: AnchorCategory,
}

/// Priority given to README files below the repository root.
/// Deliberately under the root README (100) but above manifests (85).
const NESTED_README_PRIORITY: i32 = 88;

/// The fixed pattern catalog, highest tier first. Order breaks priority
/// ties, so keep related rows grouped.
const CATALOG: &[AnchorSpec] = &[
    // Tier 1: project-overview documentation
    AnchorSpec { pattern: "README.md", priority: 100, reason: "project overview", category: AnchorCategory::Documentation },
    AnchorSpec { pattern: "README.rst", priority: 99, reason: "project overview", category: AnchorCategory::Documentation },
    AnchorSpec { pattern: "README.txt", priority: 98, reason: "project overview", category: AnchorCategory::Documentation },
    AnchorSpec { pattern: "README", priority: 98, reason: "project overview", category: AnchorCategory::Documentation },
    // Tier 2: build and dependency entry points
    AnchorSpec { pattern: "package.json", priority: 85, reason: "node package manifest", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "Cargo.toml", priority: 85, reason: "rust crate manifest", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "pyproject.toml", priority: 85, reason: "python project manifest", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "Makefile", priority: 85, reason: "make targets", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "makefile", priority: 85, reason: "make targets", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "justfile", priority: 84, reason: "just recipes", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "go.mod", priority: 84, reason: "go module definition", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "pom.xml", priority: 83, reason: "maven project definition", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "build.gradle", priority: 83, reason: "gradle build script", category: AnchorCategory::Entrypoint },
    AnchorSpec { pattern: "requirements.txt", priority: 82, reason: "python dependencies", category: AnchorCategory::Entrypoint },
    // Tier 3: infrastructure and tooling configuration
    AnchorSpec { pattern: "docker-compose.yml", priority: 80, reason: "service orchestration", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: "docker-compose.yaml", priority: 80, reason: "service orchestration", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: "compose.yml", priority: 79, reason: "service orchestration", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: "compose.yaml", priority: 79, reason: "service orchestration", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: "Dockerfile", priority: 78, reason: "container image build", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: "tsconfig.json", priority: 74, reason: "typescript configuration", category: AnchorCategory::Configuration },
    AnchorSpec { pattern: ".github/workflows/*.yml", priority: 72, reason: "ci workflow", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: ".github/workflows/*.yaml", priority: 72, reason: "ci workflow", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: ".gitlab-ci.yml", priority: 72, reason: "ci workflow", category: AnchorCategory::Infrastructure },
    AnchorSpec { pattern: "Jenkinsfile", priority: 71, reason: "ci workflow", category: AnchorCategory::Infrastructure },
    // Tier 4: per-language code entry points
    AnchorSpec { pattern: "src/main.rs", priority: 80, reason: "rust binary entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/index.ts", priority: 80, reason: "typescript entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/index.js", priority: 79, reason: "javascript entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/main.ts", priority: 79, reason: "typescript entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/main.py", priority: 78, reason: "python entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "main.py", priority: 78, reason: "python entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "cmd/*/main.go", priority: 78, reason: "go command entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "main.go", priority: 77, reason: "go entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "app.py", priority: 77, reason: "python application entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/lib.rs", priority: 76, reason: "rust library root", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "index.js", priority: 76, reason: "javascript entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "index.ts", priority: 76, reason: "typescript entry point", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/app.ts", priority: 75, reason: "typescript application root", category: AnchorCategory::CodeEntry },
    AnchorSpec { pattern: "src/app.js", priority: 74, reason: "javascript application root", category: AnchorCategory::CodeEntry },
    // Tier 5: contextual documentation
    AnchorSpec { pattern: "ARCHITECTURE.md", priority: 65, reason: "architecture notes", category: AnchorCategory::Documentation },
    AnchorSpec { pattern: "CONTRIBUTING.md", priority: 64, reason: "contributor guide", category: AnchorCategory::Documentation },
    AnchorSpec { pattern: "docs/*.md", priority: 62, reason: "project documentation", category: AnchorCategory::Documentation },
    AnchorSpec { pattern: "CHANGELOG.md", priority: 60, reason: "release history", category: AnchorCategory::Documentation },
];

/// A ranked anchor file discovered in a repository.
#[derive(Debug, Clone)]
pub struct AnchorFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Rank; higher is read first.
    pub priority: i32,
    /// Why this file is worth reading.
    pub reason: String,
    /// Signal category.
    pub category: AnchorCategory,
}

/// How deep the anchor walk descends. Anchors live near the root by
/// convention; this also bounds walk cost on pathological trees.
const MAX_WALK_DEPTH: usize = 8;

/// Find and rank anchor files under `repo_root`.
///
/// Deterministic: the walk is name-sorted, every path appears at most once
/// (first catalog match wins), and the result is sorted by priority
/// descending with catalog order breaking ties.
#[must_use]
pub fn find_anchor_files(repo_root: &Path) -> Vec<AnchorFile> {
    // One matcher per catalog row, index-aligned; a row whose pattern fails
    // to compile simply never matches.
    let matchers: Vec<Option<globset::GlobMatcher>> = CATALOG
        .iter()
        .map(|spec| {
            GlobBuilder::new(spec.pattern)
                .literal_separator(true)
                .build()
                .map(|glob| glob.compile_matcher())
                .ok()
        })
        .collect();

    let mut walker = WalkBuilder::new(repo_root);
    walker
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .max_depth(Some(MAX_WALK_DEPTH))
        .sort_by_file_name(std::ffi::OsStr::cmp);
    walker.filter_entry(|entry| {
        entry
            .file_name()
            .to_str()
            .is_none_or(|name| !EXCLUDED_DIRS.contains(&name))
    });

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut found: Vec<(usize, AnchorFile)> = Vec::new();

    for result in walker.build() {
        let Ok(entry) = result else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(repo_root) else { continue };

        let anchor = match_catalog(&matchers, rel).or_else(|| nested_readme(rel));
        if let Some((catalog_index, priority, reason, category)) = anchor {
            let resolved = normalize(path);
            if seen.insert(resolved.clone()) {
                found.push((
                    catalog_index,
                    AnchorFile {
                        path: resolved,
                        priority,
                        reason: reason.to_string(),
                        category,
                    },
                ));
            }
        }
    }

    // Priority descending; catalog order, then path, break ties.
    found.sort_by(|(ia, a), (ib, b)| {
        b.priority
            .cmp(&a.priority)
            .then(ia.cmp(ib))
            .then(a.path.cmp(&b.path))
    });
    found.into_iter().map(|(_, anchor)| anchor).collect()
}

/// First catalog row matching the repo-relative path, if any.
fn match_catalog(
    matchers: &[Option<globset::GlobMatcher>],
    rel: &Path,
) -> Option<(usize, i32, &'static str, AnchorCategory)> {
    CATALOG
        .iter()
        .zip(matchers)
        .enumerate()
        .find(|(_, (_, matcher))| matcher.as_ref().is_some_and(|m| m.is_match(rel)))
        .map(|(index, (spec, _))| (index, spec.priority, spec.reason, spec.category))
}

/// Catch-all for README files nested below the root, ranked under the
/// root README.
fn nested_readme(rel: &Path) -> Option<(usize, i32, &'static str, AnchorCategory)> {
    let name = rel.file_name()?.to_str()?;
    let is_readme = matches!(name, "README.md" | "README.rst" | "README.txt" | "README");
    if is_readme && rel.parent().is_some_and(|parent| !parent.as_os_str().is_empty()) {
        Some((
            CATALOG.len(),
            NESTED_README_PRIORITY,
            "nested project documentation",
            AnchorCategory::Documentation,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn readme_outranks_everything() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "package.json");
        touch(dir.path(), "README.md");
        touch(dir.path(), "Makefile");

        let anchors = find_anchor_files(dir.path());
        assert_eq!(anchors[0].path.file_name().unwrap(), "README.md");
        assert_eq!(anchors[0].priority, 100);
    }

    #[test]
    fn nested_readme_ranks_below_root_readme_above_manifests() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "services/api/README.md");
        touch(dir.path(), "package.json");

        let anchors = find_anchor_files(dir.path());
        let names: Vec<String> = anchors
            .iter()
            .map(|a| a.path.display().to_string())
            .collect();
        assert!(names[0].ends_with("README.md") && !names[0].contains("services"));
        assert!(names[1].contains("services"));
        assert!(names[2].ends_with("package.json"));
    }

    #[test]
    fn results_are_deterministic_and_unique() {
        let dir = tempfile::tempdir().unwrap();
        for rel in [
            "README.md",
            "Makefile",
            "package.json",
            "docker-compose.yml",
            "src/index.ts",
            "docs/guide.md",
            "a/README.md",
            "b/README.md",
        ] {
            touch(dir.path(), rel);
        }

        let first = find_anchor_files(dir.path());
        let second = find_anchor_files(dir.path());
        let first_paths: Vec<_> = first.iter().map(|a| a.path.clone()).collect();
        let second_paths: Vec<_> = second.iter().map(|a| a.path.clone()).collect();
        assert_eq!(first_paths, second_paths);

        let unique: HashSet<_> = first_paths.iter().collect();
        assert_eq!(unique.len(), first_paths.len());
    }

    #[test]
    fn dependency_directories_are_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "node_modules/somelib/README.md");
        touch(dir.path(), "target/debug/README.md");
        touch(dir.path(), "README.md");

        let anchors = find_anchor_files(dir.path());
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn ci_workflows_match_path_scoped_globs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".github/workflows/ci.yml");

        let anchors = find_anchor_files(dir.path());
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].category, AnchorCategory::Infrastructure);
        assert_eq!(anchors[0].priority, 72);
    }
}
