//! Make-target extraction and categorization.

use std::fmt;

/// The categories a make target can fall into, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCategory {
    /// Starts the application.
    Run,
    /// Compiles or packages.
    Build,
    /// Runs the test suite.
    Test,
    /// Installs dependencies or prepares the environment.
    Setup,
    /// Container workflows.
    Docker,
    /// Ships to an environment.
    Deploy,
    /// Formatters and linters.
    Lint,
    /// Removes artifacts.
    Clean,
    /// Anything else.
    Other,
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Run => "run",
            Self::Build => "build",
            Self::Test => "test",
            Self::Setup => "setup",
            Self::Docker => "docker",
            Self::Deploy => "deploy",
            Self::Lint => "lint",
            Self::Clean => "clean",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Fixed order for the rendered summary.
pub const DISPLAY_ORDER: &[TargetCategory] = &[
    TargetCategory::Run,
    TargetCategory::Build,
    TargetCategory::Test,
    TargetCategory::Setup,
    TargetCategory::Docker,
    TargetCategory::Deploy,
    TargetCategory::Lint,
    TargetCategory::Clean,
    TargetCategory::Other,
];

/// A parsed make target.
#[derive(Debug, Clone)]
pub struct MakeTarget {
    /// Target name (left of the colon).
    pub name: String,
    /// Prerequisites (right of the colon).
    pub dependencies: Vec<String>,
    /// Recipe lines, with `@`/`-` suppressors stripped.
    pub commands: Vec<String>,
    /// Heuristic category.
    pub category: TargetCategory,
}

/// Parse a Makefile-like text into targets.
///
/// A header is a `name: dependencies` line that is not indented, not a
/// comment, and not a variable assignment (contains no `=`). Recipe lines
/// are the subsequent tab-indented lines; any other non-indented line
/// closes the block. Pattern rules and special `.`-prefixed targets are
/// skipped.
#[must_use]
pub fn parse_makefile(text: &str) -> Vec<MakeTarget> {
    let mut targets: Vec<MakeTarget> = Vec::new();
    let mut current: Option<MakeTarget> = None;

    for line in text.lines() {
        if line.starts_with('\t') {
            if let Some(target) = current.as_mut() {
                let command = line
                    .trim_start_matches('\t')
                    .trim_start_matches(['@', '-'])
                    .trim();
                if !command.is_empty() {
                    target.commands.push(command.to_string());
                }
            }
            continue;
        }

        // A non-recipe line always closes the open block.
        if let Some(target) = current.take() {
            targets.push(target);
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }
        let Some((name_part, deps_part)) = trimmed.split_once(':') else {
            continue;
        };
        if name_part.contains('=') || deps_part.starts_with('=') {
            continue; // variable assignment, e.g. `FOO := bar` / `FOO ?= bar`
        }
        let name = name_part.trim();
        if name.is_empty()
            || name.contains(char::is_whitespace)
            || name.starts_with('.')
            || name.contains('%')
            || name.contains('$')
        {
            continue;
        }

        current = Some(MakeTarget {
            name: name.to_string(),
            dependencies: deps_part.split_whitespace().map(str::to_string).collect(),
            commands: Vec::new(),
            category: TargetCategory::Other,
        });
    }
    if let Some(target) = current.take() {
        targets.push(target);
    }

    for target in &mut targets {
        target.category = categorize(&target.name, &target.commands);
    }
    targets
}

/// Keyword tables checked in order; the first hit wins, so test keywords
/// beat build keywords and a `pytest` command body beats an ambiguous name.
const CATEGORY_KEYWORDS: &[(TargetCategory, &[&str])] = &[
    (TargetCategory::Test, &["test", "pytest", "jest", "mocha", "tox", "spec", "coverage"]),
    (TargetCategory::Lint, &["lint", "clippy", "eslint", "flake8", "fmt", "format"]),
    (TargetCategory::Docker, &["docker", "podman", "compose", "container"]),
    (TargetCategory::Deploy, &["deploy", "release", "publish", "ship"]),
    (TargetCategory::Clean, &["clean", "clear", "prune"]),
    (TargetCategory::Setup, &["setup", "install", "init", "bootstrap", "deps"]),
    (TargetCategory::Run, &["run", "start", "serve", "dev", "watch"]),
    (TargetCategory::Build, &["build", "compile", "dist", "package"]),
];

/// Categorize a target from its name and joined command text.
#[must_use]
pub fn categorize(name: &str, commands: &[String]) -> TargetCategory {
    let name = name.to_lowercase();
    let body = commands.join(" ").to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| name.contains(kw) || body.contains(kw)) {
            return *category;
        }
    }
    TargetCategory::Other
}

/// Interpreters whose first file argument is a code entry point.
const INTERPRETERS: &[&str] = &["python", "python3", "node", "deno", "bun", "ruby"];

/// Package managers with a `run <script>` idiom.
const PACKAGE_MANAGERS: &[&str] = &["npm", "yarn", "pnpm"];

/// Extract candidate entry-point scripts from run-categorized targets.
///
/// Recognized idioms per command line: interpreter-plus-file
/// (`node server.js`), relative executable (`./bin/serve`), and
/// package-manager run-script (`npm run dev`).
#[must_use]
pub fn extract_entry_points(targets: &[MakeTarget]) -> Vec<String> {
    let mut entries = Vec::new();
    for target in targets {
        if target.category != TargetCategory::Run && !target.name.contains("start") {
            continue;
        }
        for command in &target.commands {
            let tokens: Vec<&str> = command.split_whitespace().collect();
            match tokens.as_slice() {
                [interpreter, file, ..] if INTERPRETERS.contains(interpreter) => {
                    entries.push((*file).to_string());
                }
                [pm, "run", script, ..] if PACKAGE_MANAGERS.contains(pm) => {
                    entries.push(format!("{script} ({pm} script)"));
                }
                [exe, ..] if exe.starts_with("./") => {
                    entries.push((*exe).to_string());
                }
                _ => {}
            }
        }
    }
    entries.dedup();
    entries
}

/// Render a categorized, human-readable target summary.
#[must_use]
pub fn summarize(targets: &[MakeTarget]) -> String {
    if targets.is_empty() {
        return "No make targets found.".to_string();
    }
    let mut out = String::from("Make targets:\n");
    for category in DISPLAY_ORDER {
        let group: Vec<&MakeTarget> =
            targets.iter().filter(|t| t.category == *category).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("  {category}:\n"));
        for target in group {
            match target.commands.first() {
                Some(command) => out.push_str(&format!("    - {}: {}\n", target.name, command)),
                None => out.push_str(&format!("    - {}\n", target.name)),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FIXTURE: &str = "\
# top comment
CC := gcc

build: deps
\tgcc -o app main.c

test:
\tpytest tests/

run:
\t@node server.js

clean:
\trm -rf out/

deploy:
\tscp app host:/srv/

lint:
\teslint src/
";

    #[test]
    fn parses_targets_and_recipes() {
        let targets = parse_makefile(FIXTURE);
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["build", "test", "run", "clean", "deploy", "lint"]);

        let build = &targets[0];
        assert_eq!(build.dependencies, vec!["deps"]);
        assert_eq!(build.commands, vec!["gcc -o app main.c"]);

        // `@` suppressor is stripped.
        assert_eq!(targets[2].commands, vec!["node server.js"]);
    }

    #[test]
    fn categorizes_the_standard_names() {
        let targets = parse_makefile(FIXTURE);
        let categories: Vec<TargetCategory> = targets.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![
                TargetCategory::Build,
                TargetCategory::Test,
                TargetCategory::Run,
                TargetCategory::Clean,
                TargetCategory::Deploy,
                TargetCategory::Lint,
            ]
        );
    }

    #[test]
    fn command_body_wins_over_ambiguous_name() {
        let category = categorize("verify", &["pytest -x tests/".to_string()]);
        assert_eq!(category, TargetCategory::Test);
    }

    #[test]
    fn variable_assignments_are_not_targets() {
        let targets = parse_makefile("FOO := bar:baz\nPATH ?= /usr/bin:/bin\n");
        assert!(targets.is_empty());
    }

    #[test]
    fn entry_points_from_run_targets() {
        let targets = parse_makefile(FIXTURE);
        assert_eq!(extract_entry_points(&targets), vec!["server.js"]);
    }

    #[test]
    fn entry_point_idioms() {
        let targets = vec![MakeTarget {
            name: "start".into(),
            dependencies: vec![],
            commands: vec![
                "python3 app/main.py --port 8080".into(),
                "./bin/serve".into(),
                "npm run dev".into(),
            ],
            category: TargetCategory::Run,
        }];
        let entries = extract_entry_points(&targets);
        assert_eq!(entries, vec!["app/main.py", "./bin/serve", "dev (npm script)"]);
    }

    #[test]
    fn summary_groups_in_fixed_order() {
        let targets = parse_makefile(FIXTURE);
        let summary = summarize(&targets);
        let run_pos = summary.find("  run:").unwrap();
        let build_pos = summary.find("  build:").unwrap();
        let clean_pos = summary.find("  clean:").unwrap();
        assert!(run_pos < build_pos);
        assert!(build_pos < clean_pos);
        assert!(summary.contains("- run: node server.js"));
    }
}
