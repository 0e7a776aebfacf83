//! Integration tests for the exploration engine.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use sidekick_explore::{ExplorationEngine, ExplorationOptions};
use sidekick_fs::PathSandbox;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn engine_for(root: &Path) -> ExplorationEngine {
    let sandbox = Arc::new(PathSandbox::new(vec![root.to_path_buf()]));
    ExplorationEngine::new(sandbox)
}

#[tokio::test]
async fn overview_combines_readme_makefile_and_entry_points() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "README.md",
        "# Billing Service\nHandles invoices and payment callbacks.",
    );
    write(dir.path(), "Makefile", "run:\n\tnode server.js\n");

    let engine = engine_for(dir.path());
    let context = engine.project_overview(dir.path(), None).await.unwrap();

    assert!(context.overview.contains("Billing Service"));
    assert!(context.overview.contains("payment callbacks"));
    // Makefile summary mentions the run target.
    assert!(context.overview.contains("run: node server.js"));
    // The run command's script is a discovered entry point.
    assert_eq!(context.entry_points, vec!["server.js"]);
    assert_eq!(context.files_read, 2);

    let rendered = context.render();
    assert!(rendered.contains("Files read: 2"));
    assert!(rendered.contains("Entry points: server.js"));
}

#[tokio::test]
async fn overview_never_reads_more_than_the_budget() {
    let dir = tempfile::tempdir().unwrap();
    // Ten anchor-matching files.
    write(dir.path(), "README.md", "readme");
    write(dir.path(), "Makefile", "build:\n\tmake it\n");
    write(dir.path(), "package.json", "{\"name\": \"x\"}");
    write(dir.path(), "docker-compose.yml", "services:\n  web:\n    image: nginx\n");
    write(dir.path(), "Dockerfile", "FROM scratch");
    write(dir.path(), "tsconfig.json", "{}");
    write(dir.path(), "CONTRIBUTING.md", "contribute");
    write(dir.path(), "CHANGELOG.md", "changes");
    write(dir.path(), "src/index.ts", "export {}");
    write(dir.path(), "a/README.md", "nested");

    let engine = engine_for(dir.path());
    let context = engine.project_overview(dir.path(), Some(3)).await.unwrap();
    assert_eq!(context.files_read, 3);

    // The three highest-priority anchors win: both READMEs and the nested
    // one outrank manifests; overview text proves which were read.
    assert!(context.overview.contains("readme"));
}

#[tokio::test]
async fn oversized_files_are_skipped_with_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "README.md", &"x".repeat(100));
    write(dir.path(), "Makefile", "run:\n\tnode app.js\n");

    let sandbox = Arc::new(PathSandbox::new(vec![dir.path().to_path_buf()]));
    let options = ExplorationOptions {
        max_file_size: 50,
        ..ExplorationOptions::default()
    };
    let engine = ExplorationEngine::with_options(sandbox, options);

    let context = engine.project_overview(dir.path(), None).await.unwrap();
    assert!(context.overview.contains("skipped README.md"));
    assert!(context.overview.contains("exceeds the 50 byte ceiling"));
    // The skipped file was not read; the Makefile was.
    assert_eq!(context.files_read, 1);
}

#[tokio::test]
async fn compose_services_and_manifest_entries_are_recorded() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"name": "shop", "main": "src/index.js", "dependencies": {"express": "^4"}}"#,
    );
    write(
        dir.path(),
        "docker-compose.yml",
        "services:\n  api:\n    build: .\n  db:\n    image: postgres\n",
    );

    let engine = engine_for(dir.path());
    let context = engine.project_overview(dir.path(), None).await.unwrap();

    assert_eq!(context.services, vec!["api", "db"]);
    assert_eq!(context.entry_points, vec!["src/index.js"]);
    assert!(context.overview.contains("shop"));
}

#[tokio::test]
async fn exploration_outside_the_sandbox_is_denied() {
    let allowed = tempfile::tempdir().unwrap();
    let forbidden = tempfile::tempdir().unwrap();
    write(forbidden.path(), "README.md", "secret");

    let engine = engine_for(allowed.path());
    let err = engine.project_overview(forbidden.path(), None).await.unwrap_err();
    assert!(err.to_string().contains("access denied"));
}
