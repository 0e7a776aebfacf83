//! Skills: markdown workflow knowledge appended to the system prompt.
//!
//! The loading mechanism is deliberately minimal — skills are an opaque
//! text blob as far as the agent core is concerned.

use std::path::Path;

/// Concatenate the `.md` files of a directory, sorted by file name, each
/// prefixed with its name. A missing directory yields an empty string.
///
/// # Errors
///
/// Propagates I/O errors other than the directory not existing.
pub fn load_skills(dir: &Path) -> std::io::Result<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "skills directory missing");
            return Ok(String::new());
        }
        Err(e) => return Err(e),
    };

    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();

    let mut out = String::new();
    for path in files {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(&path)?;
        out.push_str(&format!("### {name}\n{content}\n"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn concatenates_markdown_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-confluence.md"), "confluence notes").unwrap();
        fs::write(dir.path().join("a-jira.md"), "jira notes").unwrap();
        fs::write(dir.path().join("ignore.txt"), "not a skill").unwrap();

        let skills = load_skills(dir.path()).unwrap();
        let jira = skills.find("jira notes").unwrap();
        let confluence = skills.find("confluence notes").unwrap();
        assert!(jira < confluence);
        assert!(!skills.contains("not a skill"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let skills = load_skills(Path::new("/definitely/not/here")).unwrap();
        assert!(skills.is_empty());
    }
}
