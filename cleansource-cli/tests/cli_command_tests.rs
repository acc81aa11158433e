//! Integration tests for the `scan`, `fingerprint`, `detect` and `config` commands.
//!
//! Commands run against real directories in a tempdir. Dependency resolution is
//! exercised with Gradle only, which never executes an external tool.

use std::fs;
use std::path::Path;

use serial_test::serial;
use tempfile::TempDir;

use cleansource_cli::cli::{DigestArg, FingerprintArgs, ScanArgs};
use cleansource_cli::commands::{self, load_config};
use cleansource_cli::error::CliError;
use cleansource_core::config::CleansourceConfig;
use cleansource_core::types::{BuildTool, DependencyRoot};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("should create parent dir");
    }
    fs::write(path, content).expect("should write file");
}

fn gradle_project(root: &Path) {
    write(
        root,
        "build.gradle",
        "rootProject.name = 'inventory'\nversion = '2.0.0'\n\ndependencies {\n    \
         implementation 'org.slf4j:slf4j-api:2.0.9'\n    \
         testImplementation 'org.junit.jupiter:junit-jupiter:5.10.1'\n}\n",
    );
    write(root, "src/main/java/App.java", "class App {}\n");
    write(root, "node_modules/x/index.js", "module.exports = 1;\n");
}

fn scan_args(root: &Path, out: &Path) -> ScanArgs {
    ScanArgs {
        path: Some(root.to_path_buf()),
        output_dir: Some(out.to_path_buf()),
        no_build_depend: false,
        digest: None,
    }
}

#[tokio::test]
async fn test_scan_writes_fingerprint_and_dependencies() {
    // Given: a Gradle project and a separate output dir
    let src = TempDir::new().expect("should create temp dir");
    let out = TempDir::new().expect("should create temp dir");
    gradle_project(src.path());

    // When: running scan
    let report = commands::scan::run(scan_args(src.path(), out.path()), &CleansourceConfig::default())
        .await
        .expect("scan should succeed");

    // Then: two eligible files fingerprinted, node_modules skipped
    assert_eq!(report.fingerprint.files_written, 2);
    assert!(out.path().join("fingerprints.wfp").exists());
    assert!(report.dir_size > 0);

    // And: dependencies.json next to the fingerprint artifact
    let deps = report.dependencies.expect("dependency report expected");
    assert_eq!(deps.detected, vec![BuildTool::Gradle]);
    assert_eq!(deps.total_dependencies(), 2);
    assert!(deps.failed.is_empty());

    let json = fs::read_to_string(out.path().join("dependencies.json"))
        .expect("dependencies.json should exist");
    let roots: Vec<DependencyRoot> = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].project_name, "inventory");
    assert_eq!(roots[0].project_version, "2.0.0");
    assert!(json.contains("\"projectName\""), "camelCase field names");
}

#[tokio::test]
async fn test_scan_without_build_depend_skips_dependencies() {
    let src = TempDir::new().expect("should create temp dir");
    let out = TempDir::new().expect("should create temp dir");
    gradle_project(src.path());

    let mut args = scan_args(src.path(), out.path());
    args.no_build_depend = true;

    let report = commands::scan::run(args, &CleansourceConfig::default())
        .await
        .expect("scan should succeed");

    assert!(report.dependencies.is_none());
    assert!(!out.path().join("dependencies.json").exists());
}

#[tokio::test]
async fn test_scan_config_build_depend_false_skips_dependencies() {
    let src = TempDir::new().expect("should create temp dir");
    let out = TempDir::new().expect("should create temp dir");
    gradle_project(src.path());

    let mut config = CleansourceConfig::default();
    config.scan.build_depend = false;

    let report = commands::scan::run(scan_args(src.path(), out.path()), &config)
        .await
        .expect("scan should succeed");
    assert!(report.dependencies.is_none());
}

#[tokio::test]
async fn test_scan_missing_directory_is_scan_error() {
    let out = TempDir::new().expect("should create temp dir");
    let missing = out.path().join("missing");

    let err = commands::scan::run(scan_args(&missing, out.path()), &CleansourceConfig::default())
        .await
        .expect_err("missing directory should fail");

    assert!(matches!(err, CliError::Scan(_)));
    assert_eq!(err.exit_code(), 4);
    assert!(!out.path().join("fingerprints.wfp").exists());
}

#[tokio::test]
async fn test_scan_without_build_tools_writes_empty_list() {
    let src = TempDir::new().expect("should create temp dir");
    let out = TempDir::new().expect("should create temp dir");
    write(src.path(), "notes.txt", "hello\n");

    let report = commands::scan::run(scan_args(src.path(), out.path()), &CleansourceConfig::default())
        .await
        .expect("scan should succeed");

    let deps = report.dependencies.expect("dependency report expected");
    assert!(deps.roots.is_empty());
    let json = fs::read_to_string(out.path().join("dependencies.json"))
        .expect("dependencies.json should exist");
    assert_eq!(json.trim(), "[]");
}

#[tokio::test]
async fn test_fingerprint_sha256_creates_output_dir() {
    let src = TempDir::new().expect("should create temp dir");
    let out = TempDir::new().expect("should create temp dir");
    let nested = out.path().join("artifacts/run-1");
    write(src.path(), "main.go", "package main\n");

    let args = FingerprintArgs {
        path: Some(src.path().to_path_buf()),
        output_dir: Some(nested.clone()),
        digest: Some(DigestArg::Sha256),
    };
    let report = commands::fingerprint::run(args, &CleansourceConfig::default())
        .await
        .expect("fingerprint should succeed");

    assert_eq!(report.files_written, 1);
    let content =
        fs::read_to_string(nested.join("fingerprints.wfp")).expect("artifact should exist");
    let hash = content
        .split(',')
        .find_map(|field| field.strip_prefix("hash="))
        .expect("hash field");
    assert_eq!(hash.len(), 64, "sha256 hex digest");
}

#[test]
fn test_detect_lists_tools_with_markers() {
    let src = TempDir::new().expect("should create temp dir");
    write(src.path(), "setup.py", "from setuptools import setup\n");
    write(src.path(), "requirements.txt", "flask==3.0.0\n");
    write(src.path(), "go.mod", "module example.com/x\n");

    let report = commands::detect::run(src.path()).expect("detect should succeed");

    let tools: Vec<BuildTool> = report.build_tools.iter().map(|t| t.build_tool).collect();
    assert_eq!(tools, vec![BuildTool::Pip, BuildTool::Go]);
    assert_eq!(
        report.build_tools[0].markers,
        vec!["requirements.txt".to_owned(), "setup.py".to_owned()]
    );
}

#[test]
fn test_detect_missing_directory_fails() {
    let err = commands::detect::run(Path::new("/nonexistent/cleansource")).expect_err("should fail");
    assert!(matches!(err, CliError::Scan(_)));
}

#[tokio::test]
#[serial]
async fn test_load_config_missing_file_uses_defaults() {
    let config = load_config(Path::new("/nonexistent/cleansource.toml"))
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.scan.fingerprint_file, "fingerprints.wfp");
    assert_eq!(config.scan.digest, "md5");
}

#[tokio::test]
#[serial]
async fn test_load_config_missing_file_applies_env() {
    // SAFETY: serial_test로 환경변수 접근을 직렬화
    unsafe {
        std::env::set_var("CLEANSOURCE_SCAN_DIGEST", "sha256");
    }

    let result = load_config(Path::new("/nonexistent/cleansource.toml")).await;

    unsafe {
        std::env::remove_var("CLEANSOURCE_SCAN_DIGEST");
    }

    let config = result.expect("env override should be valid");
    assert_eq!(config.scan.digest, "sha256");
}

#[tokio::test]
#[serial]
async fn test_load_config_invalid_file_is_config_error() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("cleansource.toml");
    fs::write(&path, "[scan]\ndigest = \"crc32\"\n").expect("should write config");

    let err = load_config(&path).await.expect_err("invalid digest should fail");
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial]
async fn test_config_validate_reports_errors() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[general\nlog_level = \"info\"\n").expect("should write config");

    let report = commands::config::validate(&path).await;
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);

    let missing = commands::config::validate(&dir.path().join("missing.toml")).await;
    assert!(!missing.valid, "validate reports a missing file");
}

#[tokio::test]
#[serial]
async fn test_config_show_section() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("cleansource.toml");
    fs::write(&path, "[tools]\nmaven = \"/opt/maven/bin/mvn\"\n").expect("should write config");

    let report = commands::config::show(&path, Some("tools"))
        .await
        .expect("show should succeed");
    assert_eq!(report.section.as_deref(), Some("tools"));
    assert!(report.config_toml.contains("/opt/maven/bin/mvn"));

    let err = commands::config::show(&path, Some("network"))
        .await
        .expect_err("unknown section should fail");
    assert!(matches!(err, CliError::Command(_)));
}
