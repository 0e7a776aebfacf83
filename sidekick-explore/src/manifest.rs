//! Structured summaries of package manifests and tooling configuration.

/// How many dependency names a summary samples.
const MAX_DEPENDENCIES: usize = 10;
/// How many script names a summary samples.
const MAX_SCRIPTS: usize = 12;

/// Structured fields pulled from a package manifest.
#[derive(Debug, Clone, Default)]
pub struct ManifestSummary {
    /// Declared package name.
    pub name: Option<String>,
    /// Declared version.
    pub version: Option<String>,
    /// Declared description.
    pub description: Option<String>,
    /// Declared entry point (package.json `main`, Cargo `[[bin]]` path).
    pub entry_point: Option<String>,
    /// Script names, bounded sample.
    pub scripts: Vec<String>,
    /// Dependency names, bounded sample.
    pub dependencies: Vec<String>,
}

impl ManifestSummary {
    /// Render the summary as overview text.
    #[must_use]
    pub fn render(&self, label: &str) -> String {
        let mut out = format!("{label}:");
        if let Some(name) = &self.name {
            out.push_str(&format!(" {name}"));
        }
        if let Some(version) = &self.version {
            out.push_str(&format!(" v{version}"));
        }
        out.push('\n');
        if let Some(description) = &self.description {
            out.push_str(&format!("  {description}\n"));
        }
        if let Some(entry) = &self.entry_point {
            out.push_str(&format!("  entry point: {entry}\n"));
        }
        if !self.scripts.is_empty() {
            out.push_str(&format!("  scripts: {}\n", self.scripts.join(", ")));
        }
        if !self.dependencies.is_empty() {
            out.push_str(&format!(
                "  dependencies (sample): {}\n",
                self.dependencies.join(", ")
            ));
        }
        out
    }
}

/// Summarize a `package.json`, or `None` when it does not parse.
#[must_use]
pub fn summarize_package_json(text: &str) -> Option<ManifestSummary> {
    let json: serde_json::Value = serde_json::from_str(text).ok()?;
    let object = json.as_object()?;

    let string_field =
        |key: &str| object.get(key).and_then(|v| v.as_str()).map(str::to_string);

    let scripts = object
        .get("scripts")
        .and_then(|v| v.as_object())
        .map(|scripts| scripts.keys().take(MAX_SCRIPTS).cloned().collect())
        .unwrap_or_default();

    let dependencies = object
        .get("dependencies")
        .and_then(|v| v.as_object())
        .map(|deps| deps.keys().take(MAX_DEPENDENCIES).cloned().collect())
        .unwrap_or_default();

    Some(ManifestSummary {
        name: string_field("name"),
        version: string_field("version"),
        description: string_field("description"),
        entry_point: string_field("main"),
        scripts,
        dependencies,
    })
}

/// Summarize a `Cargo.toml`, or `None` when it does not parse.
#[must_use]
pub fn summarize_cargo_toml(text: &str) -> Option<ManifestSummary> {
    let value: toml::Value = text.parse().ok()?;
    let package = value.get("package");

    let string_field = |key: &str| {
        package
            .and_then(|pkg| pkg.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let entry_point = value
        .get("bin")
        .and_then(|bins| bins.as_array())
        .and_then(|bins| bins.first())
        .and_then(|bin| bin.get("path"))
        .and_then(|path| path.as_str())
        .map(str::to_string);

    let dependencies = value
        .get("dependencies")
        .and_then(|deps| deps.as_table())
        .map(|deps| deps.keys().take(MAX_DEPENDENCIES).cloned().collect())
        .unwrap_or_default();

    Some(ManifestSummary {
        name: string_field("name"),
        version: string_field("version"),
        description: string_field("description"),
        entry_point,
        scripts: Vec::new(),
        dependencies,
    })
}

/// Extract `compilerOptions.paths` aliases from a tsconfig.
///
/// tsconfig files routinely carry `//` comments, which strict JSON
/// rejects; comment lines are dropped before parsing and any remaining
/// parse failure yields no aliases.
#[must_use]
pub fn extract_path_aliases(text: &str) -> Vec<(String, Vec<String>)> {
    let stripped: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    let Ok(json) = serde_json::from_str::<serde_json::Value>(&stripped) else {
        return Vec::new();
    };
    let Some(paths) = json
        .get("compilerOptions")
        .and_then(|opts| opts.get("paths"))
        .and_then(|paths| paths.as_object())
    else {
        return Vec::new();
    };

    paths
        .iter()
        .map(|(alias, targets)| {
            let targets = targets
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            (alias.clone(), targets)
        })
        .collect()
}
