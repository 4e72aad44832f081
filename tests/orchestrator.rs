use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use workspace_inputs::{cache::PROJECT_SNAPSHOT_FILENAME, Config, Orchestrator, Project};

fn write(root: &Path, file: &str, contents: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn monorepo() -> tempfile::TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "package.json",
        r#"{ "name": "monorepo", "version": "0.0.0", "private": true, "workspaces": ["packages/*"] }"#,
    );
    write(
        root.path(),
        "lerna.json",
        r#"{ "version": "0.0.0", "packages": ["packages/*"] }"#,
    );
    write(
        root.path(),
        "packages/foo/package.json",
        r#"{ "name": "@monorepo/foo", "version": "1.0.0" }"#,
    );
    write(
        root.path(),
        "packages/foo/tsconfig.json",
        r#"{
            // sources only
            "include": ["src/**/*.ts"],
        }"#,
    );
    write(root.path(), "packages/foo/src/index.ts", "export {};");
    write(
        root.path(),
        "packages/bar/package.json",
        r#"{ "name": "@monorepo/bar", "version": "1.0.0", "dependencies": { "@monorepo/foo": "1.0.0" } }"#,
    );
    write(root.path(), "packages/bar/index.js", "module.exports = {};");
    root
}

fn config() -> Config {
    Config::default().with_concurrency(NonZeroUsize::new(4).unwrap())
}

#[test]
fn discovers_workspaces_by_name() {
    let root = monorepo();
    let project = Project::discover(root.path()).unwrap();
    let names: Vec<&str> = project
        .workspaces()
        .iter()
        .map(|workspace| workspace.name.as_str())
        .collect();
    assert_eq!(names, vec!["@monorepo/bar", "@monorepo/foo"]);
    assert!(project.workspaces()[1]
        .directory
        .ends_with("packages/foo"));
}

#[tokio::test(flavor = "multi_thread")]
async fn reports_updated_workspaces_between_runs() {
    let root = monorepo();
    let orchestrator = Orchestrator::new(root.path(), config());

    let first = orchestrator.run().await.unwrap();
    assert_eq!(first.workspaces, 2);
    assert_eq!(first.updated, vec!["@monorepo/bar", "@monorepo/foo"]);
    assert!(first.failed.is_empty());
    assert!(orchestrator.cache().has(PROJECT_SNAPSHOT_FILENAME));

    let second = orchestrator.run().await.unwrap();
    assert!(second.updated.is_empty());

    write(root.path(), "packages/foo/src/extra.ts", "export const extra = 1;");
    let third = orchestrator.run().await.unwrap();
    assert_eq!(third.updated, vec!["@monorepo/foo"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupt_cache_starts_from_scratch() {
    let root = monorepo();
    let orchestrator = Orchestrator::new(root.path(), config().with_cache_directory("cache"));
    orchestrator
        .cache()
        .write(PROJECT_SNAPSHOT_FILENAME, "not a snapshot")
        .unwrap();

    let summary = orchestrator.run().await.unwrap();
    assert_eq!(summary.updated.len(), 2);
}

#[tokio::test]
async fn missing_manifest_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    assert!(Orchestrator::new(root.path(), config()).run().await.is_err());
}
