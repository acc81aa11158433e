//! 빌드 도구 리졸버 통합 테스트
//!
//! 외부 도구 실행을 끈 설정(`ResolverConfig::manifest_only`)으로 매니페스트 파싱 경로만 검증합니다.

use std::path::Path;

use cleansource_core::types::BuildTool;
use cleansource_scanner::{BuildToolResolver, ResolverConfig, detect_build_tools};

fn write(root: &Path, rel: &str, content: &str) {
    std::fs::write(root.join(rel), content).unwrap();
}

fn resolver() -> BuildToolResolver {
    BuildToolResolver::builder()
        .config(ResolverConfig::manifest_only())
        .span(tracing::info_span!("resolver_test"))
        .build()
}

const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>orders</artifactId>
  <version>3.2.1</version>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-core</artifactId>
      <version>6.1.1</version>
    </dependency>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-databind</artifactId>
      <version>2.16.0</version>
    </dependency>
    <dependency>
      <groupId>org.junit.jupiter</groupId>
      <artifactId>junit-jupiter</artifactId>
      <version>5.10.1</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>"#;

const PACKAGE_JSON: &str = r#"{
  "name": "storefront",
  "version": "0.4.0",
  "dependencies": { "express": "^4.18.2", "lodash": "^4.17.21" },
  "devDependencies": { "jest": "^29.7.0" }
}"#;

#[tokio::test]
async fn valid_npm_and_malformed_maven_yield_one_root() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "package.json", PACKAGE_JSON);
    write(dir.path(), "pom.xml", "<project><dependencies>");

    let roots = resolver().resolve(dir.path()).await;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].build_tool, BuildTool::Npm);
    assert_eq!(roots[0].project_name, "storefront");
    assert_eq!(roots[0].dependency_count(), 3);
}

#[tokio::test]
async fn polyglot_project_in_marker_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "go.mod", "module example.com/edge\n\ngo 1.22\n\nrequire github.com/gorilla/mux v1.8.1\n");
    write(dir.path(), "package.json", PACKAGE_JSON);
    write(dir.path(), "requirements.txt", "fastapi==0.104.1\nuvicorn>=0.24\n");
    write(dir.path(), "pom.xml", POM);

    let (roots, report) = resolver().resolve_with_report(dir.path()).await;

    let tools: Vec<BuildTool> = roots.iter().map(|r| r.build_tool).collect();
    assert_eq!(
        tools,
        vec![BuildTool::Maven, BuildTool::Pip, BuildTool::Npm, BuildTool::Go]
    );
    assert_eq!(report.succeeded, tools);
    assert!(report.is_complete());

    let maven = &roots[0];
    assert_eq!(maven.project_name, "orders");
    assert_eq!(maven.project_version, "3.2.1");
    assert_eq!(maven.dependency_count(), 3);
    let spring = maven.find_dependency("spring-core").unwrap();
    assert_eq!(spring.scope, "compile");
    assert_eq!(spring.kind, "jar");
    assert_eq!(maven.find_dependency("junit-jupiter").unwrap().scope, "test");

    let pip = &roots[1];
    assert_eq!(pip.find_dependency("uvicorn").unwrap().version, "0.24");

    let go = &roots[3];
    assert_eq!(go.project_name, "example.com/edge");
    assert_eq!(go.find_dependency("github.com/gorilla/mux").unwrap().version, "v1.8.1");
}

#[tokio::test]
async fn gradle_configurations_map_to_scopes() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "build.gradle",
        r#"
plugins { id 'java' }

dependencies {
    implementation 'org.apache.commons:commons-lang3:3.14.0'
    implementation 'com.google.guava:guava:32.1.3-jre'
    testImplementation 'org.junit.jupiter:junit-jupiter:5.10.1'
    compileOnly 'org.projectlombok:lombok:1.18.30'
}
"#,
    );

    let roots = resolver().resolve(dir.path()).await;
    assert_eq!(roots.len(), 1);
    let scopes: Vec<&str> = roots[0]
        .dependencies
        .iter()
        .map(|d| d.scope.as_str())
        .collect();
    assert_eq!(scopes, vec!["runtime", "runtime", "test", "provided"]);
}

#[tokio::test]
async fn gradle_groovy_and_kotlin_detected_once() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build.gradle", "implementation 'a:b:1.0'\n");
    write(dir.path(), "build.gradle.kts", "implementation(\"c:d:2.0\")\n");

    assert_eq!(detect_build_tools(dir.path()), vec![BuildTool::Gradle]);

    // build.gradle이 우선
    let roots = resolver().resolve(dir.path()).await;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].dependencies[0].name, "b");
}

#[tokio::test]
async fn empty_directory_resolves_to_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let (roots, report) = resolver().resolve_with_report(dir.path()).await;
    assert!(roots.is_empty());
    assert!(report.detected.is_empty());
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn pipenv_and_pip_are_independent_roots() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Pipfile", "[packages]\nrequests = \"*\"\n");
    write(dir.path(), "requirements.txt", "requests==2.31.0\n");

    let roots = resolver().resolve(dir.path()).await;
    let tools: Vec<BuildTool> = roots.iter().map(|r| r.build_tool).collect();
    assert_eq!(tools, vec![BuildTool::Pip, BuildTool::Pipenv]);
    assert_eq!(roots[0].dependencies[0].kind, "pip");
    assert_eq!(roots[1].dependencies[0].kind, "pipenv");
}

#[tokio::test]
async fn dependency_roots_serialize_to_upload_schema() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "package.json", PACKAGE_JSON);

    let roots = resolver().resolve(dir.path()).await;
    let json = serde_json::to_value(&roots).unwrap();
    assert_eq!(json[0]["projectName"], "storefront");
    assert_eq!(json[0]["buildTool"], "npm");
    assert_eq!(json[0]["dependencies"][0]["id"]["type"], "npm");
}

#[tokio::test]
async fn invalid_utf8_line_does_not_drop_line_manifests() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("requirements.txt"),
        b"requests==2.31.0\n# caf\xe9 notes\nflask==3.0.0\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("go.mod"),
        b"module example.com/svc\n// \xff\xfe\nrequire github.com/gorilla/mux v1.8.1\n",
    )
    .unwrap();

    let (roots, report) = resolver().resolve_with_report(dir.path()).await;

    assert!(report.failed.is_empty(), "unexpected failures: {:?}", report.failed);
    assert_eq!(roots.len(), 2);

    let pip = &roots[0];
    assert_eq!(pip.build_tool, BuildTool::Pip);
    let names: Vec<&str> = pip.dependencies.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["requests", "flask"]);

    let go = &roots[1];
    assert_eq!(go.build_tool, BuildTool::Go);
    assert_eq!(go.find_dependency("github.com/gorilla/mux").unwrap().version, "v1.8.1");
}
