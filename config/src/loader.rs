//! # Environment Variable Loader
//!
//! Reads configuration values from the process environment and synthesizes
//! the minimal fallback configuration used when declarative sources are
//! absent or invalid.
//!
//! # Conventions
//! - A variable that is unset, empty, or only whitespace is "not set".
//! - List-valued variables are decoded as a JSON array of strings first and
//!   fall back to a comma-separated list.
//! - Scalar variables that fail to parse are reported as
//!   [`ConfigError::InvalidEnvValue`]; callers skip to the next tier.

use crate::config::{RepositoryConfig, scalar_text};
use errors::ConfigError;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::info;

/// Environment variables consumed by the resolver.
pub mod vars {
    pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    pub const GITHUB_USER_NAME: &str = "GITHUB_USER_NAME";
    pub const GITHUB_USER_EMAIL: &str = "GITHUB_USER_EMAIL";

    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const LLM_PROVIDER: &str = "LLM_PROVIDER";
    pub const LLM_MODEL: &str = "LLM_MODEL";
    pub const LLM_TEMPERATURE: &str = "LLM_TEMPERATURE";
    pub const LLM_MAX_TOKENS: &str = "LLM_MAX_TOKENS";
    pub const LLM_TIMEOUT: &str = "LLM_TIMEOUT";

    pub const ALLOWED_FILE_TYPES: &str = "ALLOWED_FILE_TYPES";
    pub const CORS_ORIGINS: &str = "CORS_ORIGINS";

    pub const PROMETHEUS_URL: &str = "PROMETHEUS_URL";
    pub const ALERTMANAGER_URL: &str = "ALERTMANAGER_URL";
    /// Misspelled name still set by older deployments.
    pub const ALERTMANAGER_URL_LEGACY: &str = "ALTERTMANAGER_URL";
    pub const GRAFANA_URL: &str = "GRAFANA_URL";

    pub const PLATFORM_MODE: &str = "PLATFORM_MODE";
}

/// Variables a launched agent cannot run without.
pub const REQUIRED_ENV_VARS: [&str; 3] = [
    vars::OPENAI_API_KEY,
    vars::GITHUB_TOKEN,
    vars::GITHUB_REPOSITORY
];

/// Read-only view of environment variables.
///
/// The resolver reads the process environment through [`ProcessEnv`]; a
/// `HashMap<String, String>` can stand in for it when embedding the
/// resolver or in tests.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Value of `key` exactly as set, or `None` if unset or blank.
pub fn env_value(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|value| !value.trim().is_empty())
}

/// Parse `key` into `T`.
///
/// Returns `Ok(None)` if the variable is not set.
pub fn parse_env<T>(env: &dyn EnvSource, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display
{
    match env_value(env, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvValue {
                key: key.to_string(),
                reason: e.to_string()
            }),
        None => Ok(None)
    }
}

/// Decode a list value: a JSON array of scalars, else comma-separated.
///
/// Comma-separated items are trimmed and empty items dropped, so
/// `".py, .md,"` and `[".py",".md"]` decode to the same list. Numbers and
/// booleans inside a JSON array keep their textual form.
pub fn parse_list(raw: &str) -> Vec<String> {
    if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        let scalars: Result<Vec<String>, _> = items.into_iter().map(scalar_text).collect();
        if let Ok(scalars) = scalars {
            return scalars;
        }
    }

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// List-valued variable `key`, or `None` if not set.
pub fn list_env(env: &dyn EnvSource, key: &str) -> Option<Vec<String>> {
    env_value(env, key).map(|raw| parse_list(&raw))
}

/// Names from `required` that are not set.
pub fn missing_required_env(env: &dyn EnvSource, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|key| env_value(env, key).is_none())
        .map(|key| (*key).to_string())
        .collect()
}

/// Name of the synthesized fallback repository.
pub const FALLBACK_REPOSITORY: &str = "default";

const FALLBACK_REPOSITORY_TYPE: &str = "python";
const FALLBACK_PORT: u16 = 8000;
const FALLBACK_HEALTH_ENDPOINT: &str = "/health";

/// Synthesize the fallback repository set from the environment.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Produces at most one repository, named `default`, from
/// `GITHUB_REPOSITORY` (`owner/name`). Without that variable the set is
/// empty; this is not an error.
///
/// ## Usage
/// ```rust,no_run
/// use config::loader::{ProcessEnv, load_from_environment};
///
/// let repositories = load_from_environment(&ProcessEnv);
/// if let Some(repo) = repositories.get("default") {
///     println!("Fallback repository: {}", repo.github_url);
/// }
/// ```
pub fn load_from_environment(env: &dyn EnvSource) -> BTreeMap<String, RepositoryConfig> {
    info!("Loading configuration from environment variables");

    let mut repositories = BTreeMap::new();
    if let Some(github_repo) = env_value(env, vars::GITHUB_REPOSITORY) {
        repositories.insert(
            FALLBACK_REPOSITORY.to_string(),
            RepositoryConfig {
                name: FALLBACK_REPOSITORY.to_string(),
                github_url: format!("https://github.com/{github_repo}.git"),
                repo_type: FALLBACK_REPOSITORY_TYPE.to_string(),
                port: FALLBACK_PORT,
                health_endpoint: FALLBACK_HEALTH_ENDPOINT.to_string(),
                metrics_endpoint: None,
                coding_enabled: true,
                monitoring_enabled: true,
                auto_recovery: true,
                test_command: None,
                description: None
            }
        );
    }

    repositories
}
