//! Integration tests for Trellis
//!
//! These run the `trellis` binary against snapshot files and drive the
//! engine the way the binary does.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use trellis_core::{CancellationToken, ModelSnapshot, Outcome, TypeKind};
use trellis_structure::{Scope, Strategy, StructureEngine};

const SNAPSHOT: &str = r#"
projects:
  - name: base
  - name: home
    references: [base]
types:
  - qualified_name: base.Policy
    project: base
    kind: policy_side
    is_abstract: true
    associations:
      - kind: composition_master_to_detail
        target: base.Coverage
        min_cardinality: 1
        max_cardinality: "*"
        role_singular: coverage
        role_plural: coverages
  - qualified_name: base.Coverage
    project: base
    kind: policy_side
  - qualified_name: home.HomePolicy
    project: home
    kind: policy_side
    supertype: base.Policy
    associations:
      - kind: aggregation
        target: home.Building
        max_cardinality: 1
        role_singular: building
        role_plural: buildings
  - qualified_name: home.Building
    project: home
    kind: policy_side
  - qualified_name: home.FireCoverage
    project: home
    kind: policy_side
    supertype: base.Coverage
  - qualified_name: home.HomeProduct
    project: home
    kind: product_side
"#;

fn write_snapshot(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("model.yaml");
    std::fs::write(&path, SNAPSHOT).unwrap();
    path
}

fn trellis(snapshot: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .arg("--snapshot")
        .arg(snapshot)
        .args(args)
        .output()
        .expect("Failed to execute trellis")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "trellis failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_trellis"))
        .arg("--help")
        .output()
        .expect("Failed to execute trellis");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("containment structure"));
    assert!(stdout.contains("roots"));
}

#[test]
fn test_roots_per_strategy_and_side() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let strict = stdout(&trellis(&snapshot, &["roots", "--project", "home"]));
    assert_eq!(strict, "base.Policy <abstract>\n");

    let inherited = stdout(&trellis(&snapshot, &["roots", "--project", "home", "--strategy", "inherited"]));
    assert_eq!(inherited, "home.HomePolicy\n");

    let product = stdout(&trellis(&snapshot, &["roots", "--project", "home", "--side", "product"]));
    assert_eq!(product, "home.HomeProduct\n");
}

#[test]
fn test_tree_output() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let tree = stdout(&trellis(&snapshot, &["tree", "--project", "home", "--strategy", "inherited"]));
    insta::assert_snapshot!(tree, @r"
home.HomePolicy
  base.Coverage (coverage 1..*) [inherited]
    home.FireCoverage
  home.Building (building 0..1)
");

    let shallow = stdout(&trellis(&snapshot, &["tree", "--project", "home", "--depth", "0"]));
    assert_eq!(shallow, "base.Policy <abstract>\n");
}

#[test]
fn test_kinds_override() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    // Without composition base.Coverage is no longer contained in base.Policy.
    let roots = stdout(&trellis(&snapshot, &["roots", "--project", "home", "--kinds", "aggregation"]));
    assert_eq!(roots, "base.Policy <abstract>\nbase.Coverage\n");
}

#[test]
fn test_paths_output() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let paths = stdout(&trellis(&snapshot, &["paths", "home.FireCoverage", "--project", "home"]));
    assert_eq!(paths, "base.Policy > base.Coverage > home.FireCoverage\n");
}

#[test]
fn test_config_file_and_errors() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let config = dir.path().join("trellis.toml");
    std::fs::write(&config, "include_referenced_projects = false\n").unwrap();
    let local = stdout(&trellis(&snapshot, &["--config", config.to_str().unwrap(), "roots", "--project", "home"]));
    assert_eq!(local, "home.HomePolicy\nhome.FireCoverage\n");

    let unknown = trellis(&snapshot, &["roots", "--project", "nowhere"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("Unknown project"));

    let missing = trellis(&dir.path().join("absent.yaml"), &["roots", "--project", "home"]);
    assert!(!missing.status.success());
}

#[tokio::test]
async fn test_engine_on_blocking_worker() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);
    let repository = ModelSnapshot::load(&snapshot).unwrap().into_repository().unwrap();

    let mut engine = StructureEngine::new(repository);
    let token = CancellationToken::new();
    StructureEngine::<trellis_core::InMemoryRepository>::cancel(&token);

    let (engine, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = engine.compute_roots(
            &Scope::Project("home".into()),
            Strategy::InheritedAssociation,
            TypeKind::PolicySide,
            &token,
        );
        (engine, outcome)
    })
    .await
    .unwrap();

    assert!(matches!(outcome, Outcome::Cancelled(_)));
    assert!(engine.last_roots().is_empty());
}
