use assert_cmd::{Command, cargo_bin_cmd};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PLATFORM_YAML: &str = r#"
name: agent-platform
version: 1.2
environment: production
credentials:
  github:
    user_name: platform-bot
    user_email: bot@example.com
  llm:
    model: gpt-4o
services:
  prometheus:
    url: http://metrics:9090
agent_settings:
  allowed_file_types: [".py", ".rs"]
repository_access:
  default_repositories: [service-a]
"#;

const REPOSITORIES_YAML: &str = r"
target_repositories:
  service-a:
    github_url: https://github.com/acme/service-a.git
    type: python
    port: 8001
    health_endpoint: /health
  service-b:
    github_url: https://github.com/acme/service-b.git
    type: node
    port: 8002
    health_endpoint: /status
";

const AGENTS_YAML: &str = r"
platform_agents:
  coder:
    enabled: true
    port: 9001
    capabilities: [code]
    target_repositories: all
    environment: [OPENAI_API_KEY]
    volumes: []
    resources:
      cpu: 1
      memory: 512Mi
    auto_restart: true
    health_check:
      path: /health
";

/// A command with a clean environment and no colour codes.
fn platform_config(config_dir: &std::path::Path) -> Command {
    let mut cmd = cargo_bin_cmd!("agent-platform-config");
    cmd.env_clear()
        .env("NO_COLOR", "1")
        .arg("--config-dir")
        .arg(config_dir);
    cmd
}

fn full_config_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("platform.yml"), PLATFORM_YAML).unwrap();
    fs::write(dir.path().join("repositories.yml"), REPOSITORIES_YAML).unwrap();
    fs::write(dir.path().join("agents.yml"), AGENTS_YAML).unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("agent-platform-config");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("check-env"))
        .stdout(predicate::str::contains("--config-dir"));
}

#[test]
fn test_summary_json_from_sources() {
    let dir = full_config_dir();

    let output = platform_config(dir.path())
        .args(["summary", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["platform_config_loaded"], true);
    assert_eq!(summary["repositories_count"], 2);
    assert_eq!(summary["agents_count"], 1);
    assert_eq!(summary["repositories"], serde_json::json!(["service-a", "service-b"]));
    assert_eq!(summary["agents"], serde_json::json!(["coder"]));
    assert_eq!(summary["multi_repo_mode"], false);
    assert!(summary["fallback_reason"].is_null());
}

#[test]
fn test_summary_falls_back_without_sources() {
    let dir = TempDir::new().unwrap();

    platform_config(dir.path())
        .env("GITHUB_REPOSITORY", "acme/solo")
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform Configuration"))
        .stdout(predicate::str::contains("default"))
        .stderr(predicate::str::contains("no configuration sources found"));
}

#[test]
fn test_malformed_source_falls_back_to_environment() {
    let dir = full_config_dir();
    fs::write(dir.path().join("agents.yml"), "platform_agents: [unclosed").unwrap();

    let output = platform_config(dir.path())
        .env("GITHUB_REPOSITORY", "acme/solo")
        .args(["summary", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["platform_config_loaded"], false);
    assert_eq!(summary["repositories"], serde_json::json!(["default"]));
    assert_eq!(summary["agents_count"], 0);
    assert!(
        summary["fallback_reason"]
            .as_str()
            .unwrap()
            .contains("agents.yml")
    );
}

#[test]
fn test_show_reports_sources() {
    let dir = full_config_dir();

    let output = platform_config(dir.path())
        .env("OPENAI_API_KEY", "sk-secret")
        .env("LLM_MODEL", "gpt-4-turbo")
        .args(["show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let entry = |key: &str| {
        entries
            .iter()
            .find(|e| e["key"] == key)
            .unwrap_or_else(|| panic!("missing {key}"))
            .clone()
    };

    assert_eq!(entry("llm.model")["value"], "gpt-4-turbo");
    assert_eq!(entry("llm.model")["source"], "env:LLM_MODEL");
    assert_eq!(entry("llm.openai_api_key")["value"], "***");
    assert_eq!(entry("github.user_name")["value"], "platform-bot");
    assert_eq!(entry("github.user_name")["source"], "platform.yml");
    assert_eq!(entry("services.grafana")["source"], "default");
    assert_eq!(entry("agent_settings.allowed_file_types")["value"], ".py,.rs");

    let raw = String::from_utf8(output.stdout).unwrap();
    assert!(!raw.contains("sk-secret"));
}

#[test]
fn test_repos_allowed() {
    let dir = full_config_dir();

    platform_config(dir.path())
        .args(["repos", "--allowed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("service-a"))
        .stdout(predicate::str::contains("service-b").not());

    let output = platform_config(dir.path())
        .args(["repos", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let repos: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0]["name"], "service-a");
    assert_eq!(repos[0]["allowed"], true);
    assert_eq!(repos[1]["name"], "service-b");
    assert_eq!(repos[1]["port"], 8002);
    assert_eq!(repos[1]["health_endpoint"], "/status");
    assert_eq!(repos[1]["allowed"], false);
}

#[test]
fn test_repo_and_agent_lookup() {
    let dir = full_config_dir();

    platform_config(dir.path())
        .args(["repo", "service-b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"node\""))
        .stdout(predicate::str::contains("\"coding_enabled\": true"));

    platform_config(dir.path())
        .args(["agent", "coder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cpu\": \"1\""));
}

#[test]
fn test_lookup_of_unknown_name_is_not_an_error() {
    let dir = full_config_dir();

    platform_config(dir.path())
        .args(["repo", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Repository 'missing' not found"));

    platform_config(dir.path())
        .args(["agent", "ghost"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Agent 'ghost' not found"));
}

#[test]
fn test_check_env_reports_missing_variables() {
    let dir = TempDir::new().unwrap();

    platform_config(dir.path())
        .env("GITHUB_TOKEN", "ghp_x")
        .arg("check-env")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY is not set"))
        .stderr(predicate::str::contains("GITHUB_REPOSITORY is not set"))
        .stderr(predicate::str::contains("GITHUB_TOKEN").not());

    platform_config(dir.path())
        .env("GITHUB_TOKEN", "ghp_x")
        .env("OPENAI_API_KEY", "sk-x")
        .env("GITHUB_REPOSITORY", "acme/solo")
        .arg("check-env")
        .assert()
        .success()
        .stdout(predicate::str::contains("All required environment variables are set"));
}

#[test]
fn test_env_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join("platform.env");
    fs::write(&env_file, "GITHUB_REPOSITORY=acme/from-file\n").unwrap();

    platform_config(dir.path())
        .arg("--env-file")
        .arg(&env_file)
        .args(["repo", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/acme/from-file.git"));
}

#[test]
fn test_config_dir_from_environment() {
    let dir = full_config_dir();

    let mut cmd = cargo_bin_cmd!("agent-platform-config");
    cmd.env_clear()
        .env("NO_COLOR", "1")
        .env("AGENT_PLATFORM_CONFIG_DIR", dir.path())
        .args(["repos", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("service-a"));
}
