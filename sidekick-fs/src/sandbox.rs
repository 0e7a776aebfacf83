//! Allow-list path checking.

use std::path::{Component, Path, PathBuf};

use sidekick_types::ToolError;

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem, so nonexistent paths can still be checked.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping past an absolute root is clamped to the root; a
            // relative path keeps its leading `..` so the allow-list
            // check fails.
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}

/// The filesystem allow-list.
///
/// Immutable after construction; changing allowed directories means
/// constructing a new sandbox (and a new agent), not in-place mutation.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    roots: Vec<PathBuf>,
}

impl PathSandbox {
    /// Build a sandbox from root directories. Roots are normalized;
    /// relative roots are resolved against the current working directory.
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        let roots = roots
            .into_iter()
            .map(|root| {
                let absolute = if root.is_absolute() { root } else { cwd.join(root) };
                normalize(&absolute)
            })
            .collect();
        Self { roots }
    }

    /// The normalized allowed roots.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether the sandbox has at least one allowed root.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.roots.is_empty()
    }

    /// Whether `path` is a root or strictly nested under one.
    ///
    /// The check is on the normalized absolute form: relative to some root
    /// it must contain no parent-traversal segment.
    #[must_use]
    pub fn is_allowed(&self, path: &Path) -> bool {
        let candidate = self.absolutize(path);
        self.roots.iter().any(|root| candidate.starts_with(root))
    }

    /// Resolve `path` to its normalized absolute form, or fail with an
    /// [`ToolError::AccessDenied`] naming the offending path.
    ///
    /// Relative paths resolve against the first allowed root.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::AccessDenied`] when the resolved path escapes
    /// every allowed root (or when no roots are configured).
    pub fn resolve(&self, path: &Path) -> Result<PathBuf, ToolError> {
        let candidate = self.absolutize(path);
        if self.roots.iter().any(|root| candidate.starts_with(root)) {
            Ok(candidate)
        } else {
            Err(ToolError::AccessDenied(path.display().to_string()))
        }
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            match self.roots.first() {
                Some(root) => normalize(&root.join(path)),
                None => normalize(path),
            }
        }
    }
}
