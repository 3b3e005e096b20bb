//! # Configuration Structures
//!
//! Typed entities decoded from the declarative sources under the
//! configuration root:
//!
//! - `platform.yml` -> [`PlatformConfig`]
//! - `repositories.yml` -> [`RepositoryConfig`] per `target_repositories` entry
//! - `agents.yml` -> [`AgentConfig`] per `platform_agents` entry
//!
//! Decoding is strict: entity structs reject unknown fields, and required
//! fields must be present. Nested platform sections type the keys the
//! resolver reads and carry everything else through untouched.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

/// Free-form section value, passed through without interpretation.
pub type RawSection = BTreeMap<String, serde_json::Value>;

/// One target code repository the platform can act on.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Describes a repository agents may code against, monitor, or recover.
/// The `name` is taken from the mapping key in `repositories.yml`, never
/// from the entry body.
///
/// ## Fields
/// - `github_url`: Source-control URL
/// - `repo_type`: Free-form stack tag (YAML key `type`)
/// - `port`: Service port (must be positive)
/// - `health_endpoint`: Health-check path
/// - `metrics_endpoint`: Optional metrics path
/// - `coding_enabled` / `monitoring_enabled` / `auto_recovery`: capability
///   flags, default `true`
/// - `test_command`: Optional test command
/// - `description`: Optional human description
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub github_url: String,

    #[serde(rename = "type")]
    pub repo_type: String,

    #[validate(range(min = 1))]
    pub port: u16,

    #[validate(length(min = 1))]
    pub health_endpoint: String,

    #[serde(default)]
    pub metrics_endpoint: Option<String>,

    #[serde(default = "default_true")]
    pub coding_enabled: bool,

    #[serde(default = "default_true")]
    pub monitoring_enabled: bool,

    #[serde(default = "default_true")]
    pub auto_recovery: bool,

    #[serde(default)]
    pub test_command: Option<String>,

    #[serde(default)]
    pub description: Option<String>
}

fn default_true() -> bool {
    true
}

/// One platform agent (a logical worker/service).
///
/// All fields are required in `agents.yml`. Resource limits and health
/// check descriptors accept any scalar and are kept as strings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_agent_port"))]
pub struct AgentConfig {
    #[serde(skip_deserializing)]
    #[validate(length(min = 1))]
    pub name: String,

    pub enabled: bool,

    pub port: u16,

    /// Ordered capability tags
    pub capabilities: Vec<String>,

    /// Target-repository selector (a name, or a pattern such as `all`)
    pub target_repositories: String,

    /// Names of environment variables the agent requires
    pub environment: Vec<String>,

    /// Mounted resource paths
    pub volumes: Vec<String>,

    #[serde(deserialize_with = "scalar_string_map")]
    pub resources: BTreeMap<String, String>,

    pub auto_restart: bool,

    #[serde(deserialize_with = "scalar_string_map")]
    pub health_check: BTreeMap<String, String>
}

fn validate_agent_port(agent: &AgentConfig) -> Result<(), ValidationError> {
    if agent.enabled && agent.port == 0 {
        return Err(ValidationError::new("enabled agent requires a positive port"));
    }
    Ok(())
}

/// Platform-wide settings, held at most once per process.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Declares credentials, service endpoints, agent-facing settings and
/// repository access for the whole platform.
///
/// ## Fields
/// - `name`, `version`, `environment`: required identity fields
/// - `credentials`: keyed by provider (`github`, `llm`, ...)
/// - `services`: keyed by service name, each with at least a `url`
/// - `agent_settings`: allowed file types, CORS origins, ...
/// - `repository_access`: default-allowed repository names, ...
/// - `agents`: raw agent declarations, not interpreted here
/// - `infrastructure`: passed through untouched
///
/// Every mapping section defaults to empty when missing or `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(deserialize_with = "scalar_string")]
    pub version: String,

    pub environment: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub credentials: CredentialsConfig,

    #[serde(default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, ServiceConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_settings: AgentSettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub repository_access: RepositoryAccess,

    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: RawSection,

    #[serde(default, deserialize_with = "null_as_default")]
    pub infrastructure: RawSection
}

/// Credentials keyed by provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub github: Option<GithubCredentialsConfig>,

    #[serde(default)]
    pub llm: Option<LlmCredentialsConfig>,

    /// Credentials for providers the resolver does not read
    #[serde(flatten)]
    pub other: RawSection
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GithubCredentialsConfig {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub user_email: Option<String>,

    #[serde(flatten)]
    pub extra: RawSection
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LlmCredentialsConfig {
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(flatten)]
    pub extra: RawSection
}

/// A platform service endpoint such as `prometheus` or `grafana`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub url: String,

    #[serde(flatten)]
    pub extra: RawSection
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentSettings {
    #[serde(default)]
    pub allowed_file_types: Option<Vec<String>>,

    #[serde(default)]
    pub cors_origins: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: RawSection
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RepositoryAccess {
    /// Repository names allowed when no explicit selection is made
    #[serde(default)]
    pub default_repositories: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: RawSection
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// String form of a scalar JSON value; null, arrays and maps are handed back.
pub(crate) fn scalar_text(value: serde_json::Value) -> Result<String, serde_json::Value> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(other)
    }
}

fn scalar_to_string<E: serde::de::Error>(
    field: &str,
    value: serde_json::Value
) -> Result<String, E> {
    scalar_text(value)
        .map_err(|other| E::custom(format!("expected a scalar for `{field}`, found {other}")))
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>
{
    let value = serde_json::Value::deserialize(deserializer)?;
    scalar_to_string("version", value)
}

fn scalar_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>
{
    let raw = RawSection::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let value = scalar_to_string::<D::Error>(&key, value)?;
            Ok((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_yaml() -> &'static str {
        r#"
enabled: true
port: 8002
capabilities: [code_generation, pull_requests]
target_repositories: all
environment: [GITHUB_TOKEN, OPENAI_API_KEY]
volumes: ["/config:/config:ro"]
resources:
  memory: 512M
  cpus: 0.5
auto_restart: true
health_check:
  endpoint: /health
  interval: 30
"#
    }

    #[test]
    fn test_repository_defaults() {
        let yaml = r#"
github_url: https://github.com/org/api.git
type: python
port: 9000
health_endpoint: /health
"#;
        let repo: RepositoryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(repo.name, "");
        assert_eq!(repo.repo_type, "python");
        assert_eq!(repo.port, 9000);
        assert!(repo.coding_enabled);
        assert!(repo.monitoring_enabled);
        assert!(repo.auto_recovery);
        assert_eq!(repo.metrics_endpoint, None);
        assert_eq!(repo.test_command, None);
    }

    #[test]
    fn test_repository_rejects_unknown_field() {
        let yaml = r#"
github_url: https://github.com/org/api.git
type: python
port: 9000
health_endpoint: /health
owner: someone
"#;
        let result: Result<RepositoryConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_repository_rejects_name_in_body() {
        let yaml = r#"
name: api
github_url: https://github.com/org/api.git
type: python
port: 9000
health_endpoint: /health
"#;
        let result: Result<RepositoryConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_repository_missing_port_fails() {
        let yaml = r#"
github_url: https://github.com/org/api.git
type: python
health_endpoint: /health
"#;
        let result: Result<RepositoryConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_agent_scalar_maps_become_strings() {
        let agent: AgentConfig = serde_yaml::from_str(agent_yaml()).unwrap();
        assert_eq!(agent.capabilities, vec!["code_generation", "pull_requests"]);
        assert_eq!(agent.resources.get("memory").map(String::as_str), Some("512M"));
        assert_eq!(agent.resources.get("cpus").map(String::as_str), Some("0.5"));
        assert_eq!(
            agent.health_check.get("interval").map(String::as_str),
            Some("30")
        );
    }

    #[test]
    fn test_agent_missing_field_fails() {
        let yaml = "enabled: true\nport: 8002\n";
        let result: Result<AgentConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_agent_port_validation() {
        let mut agent: AgentConfig = serde_yaml::from_str(agent_yaml()).unwrap();
        agent.name = "coding-agent".to_string();
        assert!(agent.validate().is_ok());

        agent.port = 0;
        assert!(agent.validate().is_err());

        agent.enabled = false;
        assert!(agent.validate().is_ok());
    }

    #[test]
    fn test_platform_minimal_has_empty_sections() {
        let yaml = "name: ai-platform\nversion: 1.0\nenvironment: dev\n";
        let platform: PlatformConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(platform.version, "1.0");
        assert_eq!(platform.credentials, CredentialsConfig::default());
        assert!(platform.services.is_empty());
        assert_eq!(platform.agent_settings.allowed_file_types, None);
        assert!(platform.infrastructure.is_empty());
    }

    #[test]
    fn test_platform_null_section_is_empty() {
        let yaml = "name: ai-platform\nversion: '2'\nenvironment: prod\ncredentials:\n";
        let platform: PlatformConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(platform.credentials.github.is_none());
        assert!(platform.credentials.llm.is_none());
    }

    #[test]
    fn test_platform_rejects_unknown_top_level_field() {
        let yaml = "name: p\nversion: '1'\nenvironment: dev\nextras: {}\n";
        let result: Result<PlatformConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_platform_missing_required_field_fails() {
        let yaml = "name: p\nenvironment: dev\n";
        let result: Result<PlatformConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_platform_nested_sections() {
        let yaml = r#"
name: ai-platform
version: "1.2.0"
environment: dev
credentials:
  github:
    token: ghp_file
    user_name: bot
  llm:
    model: gpt-4o
    temperature: 0
    max_tokens: 8000
  slack:
    webhook: https://hooks.example/abc
services:
  grafana:
    url: http://grafana.internal:3000
    dashboards: [overview]
agent_settings:
  cors_origins: ["https://app.example"]
repository_access:
  default_repositories: [api]
infrastructure:
  docker_network: platform
"#;
        let platform: PlatformConfig = serde_yaml::from_str(yaml).unwrap();
        let github = platform.credentials.github.as_ref().unwrap();
        assert_eq!(github.token.as_deref(), Some("ghp_file"));
        assert_eq!(github.user_email, None);

        let llm = platform.credentials.llm.as_ref().unwrap();
        assert_eq!(llm.model.as_deref(), Some("gpt-4o"));
        assert_eq!(llm.temperature, Some(0.0));
        assert_eq!(llm.max_tokens, Some(8000));
        assert!(platform.credentials.other.contains_key("slack"));

        let grafana = platform.services.get("grafana").unwrap();
        assert_eq!(grafana.url, "http://grafana.internal:3000");
        assert!(grafana.extra.contains_key("dashboards"));

        assert_eq!(
            platform.agent_settings.cors_origins,
            Some(vec!["https://app.example".to_string()])
        );
        assert_eq!(
            platform.repository_access.default_repositories,
            Some(vec!["api".to_string()])
        );
        assert_eq!(
            platform.infrastructure.get("docker_network"),
            Some(&serde_json::json!("platform"))
        );
    }

    #[test]
    fn test_service_requires_url() {
        let yaml = "name: p\nversion: '1'\nenvironment: dev\nservices:\n  grafana:\n    port: 3000\n";
        let result: Result<PlatformConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
