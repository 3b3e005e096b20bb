//! # Centralized Configuration
//!
//! The resolved configuration shared by every consumer of the platform:
//! repositories, agents and the optional platform entity, plus the
//! accessors that apply environment > platform > default precedence on top
//! of them.
//!
//! # Loading
//! Sources are loaded all-or-nothing. If any present source fails, nothing
//! loaded from files is kept and the environment fallback runs instead. The
//! fallback also runs when the configuration root holds no source at all.
//! Loading never returns an error; the reason for a fallback is kept in
//! [`LoadOutcome`] and reported by [`CentralizedConfig::summary`].

use crate::config::{
    AgentConfig, GithubCredentialsConfig, LlmCredentialsConfig, PlatformConfig, RepositoryConfig
};
use crate::file_loader;
use crate::loader::{self, EnvSource, ProcessEnv, REQUIRED_ENV_VARS, vars};
use crate::precedence::{Resolved, resolve};
use errors::ConfigError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Configuration root used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "/config";

pub const DEFAULT_ALLOWED_FILE_TYPES: [&str; 7] =
    [".py", ".md", ".txt", ".json", ".yml", ".yaml", ".toml"];
pub const DEFAULT_CORS_ORIGINS: [&str; 1] = ["*"];

pub const DEFAULT_LLM_PROVIDER: &str = "openai";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4";
pub const DEFAULT_LLM_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_LLM_TIMEOUT: u64 = 60;

pub const DEFAULT_PROMETHEUS_URL: &str = "http://prometheus:9090";
pub const DEFAULT_ALERTMANAGER_URL: &str = "http://alertmanager:9093";
pub const DEFAULT_GRAFANA_URL: &str = "http://grafana:3000";

const MULTI_REPO_MODE: &str = "multi_repo";
const SINGLE_REPO_MODE: &str = "single_repo";
const MASKED: &str = "***";

/// GitHub identity used by coding agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubCredentials {
    pub token: String,
    pub user_name: String,
    pub user_email: String
}

/// LLM provider settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmSettings {
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout: u64
}

/// URLs of the monitoring services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceUrls {
    pub prometheus: String,
    pub alertmanager: String,
    pub grafana: String
}

/// Diagnostic snapshot for health and debug reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub platform_config_loaded: bool,
    pub repositories_count: usize,
    pub agents_count: usize,
    pub multi_repo_mode: bool,
    pub repositories: Vec<String>,
    pub agents: Vec<String>,
    pub config_path: String,
    /// Why the environment fallback ran, if it did
    pub fallback_reason: Option<String>
}

/// Why the environment fallback replaced the declarative sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The configuration root holds none of the sources.
    NoSources,
    /// A present source could not be loaded.
    Failed(ConfigError)
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoSources => write!(f, "no configuration sources found"),
            FallbackReason::Failed(error) => write!(f, "{error}")
        }
    }
}

/// Result of the last [`CentralizedConfig::load_all_configs`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadOutcome {
    #[default]
    NotLoaded,
    /// Declarative sources loaded; lists the files that were present.
    Loaded { sources: Vec<String> },
    FellBack { reason: FallbackReason }
}

/// Entities decoded from the sources, committed only if all succeed.
struct LoadedSources {
    platform: Option<PlatformConfig>,
    repositories: Option<BTreeMap<String, RepositoryConfig>>,
    agents: Option<BTreeMap<String, AgentConfig>>
}

impl LoadedSources {
    fn present(&self) -> Vec<String> {
        [
            (self.platform.is_some(), file_loader::PLATFORM_FILE),
            (self.repositories.is_some(), file_loader::REPOSITORIES_FILE),
            (self.agents.is_some(), file_loader::AGENTS_FILE)
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, file)| file.to_string())
        .collect()
    }
}

/// Resolved configuration for the lifetime of the owning process.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Loads the declarative sources once and answers read-only queries. Each
/// query re-applies precedence against the current environment; nothing
/// beyond the loaded entities is cached.
///
/// ## Usage
/// ```rust,no_run
/// use config::CentralizedConfig;
/// use std::sync::Arc;
///
/// let config = Arc::new(CentralizedConfig::load("/config"));
/// let llm = config.get_llm_config();
/// println!("Model: {} via {}", llm.model, llm.provider);
/// ```
///
/// ## Sharing
/// Construct it once at startup and hand an `Arc` to each collaborator.
/// Loading takes `&mut self`, so a shared instance can no longer change.
pub struct CentralizedConfig {
    config_path: PathBuf,
    env: Box<dyn EnvSource>,
    platform: Option<PlatformConfig>,
    repositories: BTreeMap<String, RepositoryConfig>,
    agents: BTreeMap<String, AgentConfig>,
    outcome: LoadOutcome
}

impl fmt::Debug for CentralizedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CentralizedConfig")
            .field("config_path", &self.config_path)
            .field("platform", &self.platform.as_ref().map(|p| &p.name))
            .field("repositories", &self.repositories.keys().collect::<Vec<_>>())
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Default for CentralizedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl CentralizedConfig {
    /// Create an empty, not yet loaded configuration rooted at `config_path`.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            env: Box::new(ProcessEnv),
            platform: None,
            repositories: BTreeMap::new(),
            agents: BTreeMap::new(),
            outcome: LoadOutcome::NotLoaded
        }
    }

    /// Read environment variables from `env` instead of the process.
    #[must_use]
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Create and load in one step.
    #[must_use]
    pub fn load(config_path: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(config_path);
        config.load_all_configs();
        config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Load every declarative source, or fall back to the environment.
    ///
    /// Replaces the whole resolved state. Never fails: a source error is
    /// logged, kept in [`LoadOutcome::FellBack`], and converted into the
    /// environment fallback.
    pub fn load_all_configs(&mut self) {
        if !file_loader::any_source_exists(&self.config_path) {
            info!("No configuration sources in {:?}", self.config_path);
            self.fall_back(FallbackReason::NoSources);
            return;
        }

        match self.load_sources() {
            Ok(loaded) => {
                let sources = loaded.present();
                self.platform = loaded.platform;
                self.repositories = loaded.repositories.unwrap_or_default();
                self.agents = loaded.agents.unwrap_or_default();
                info!(
                    "Configuration loaded from {:?}: {} repositories, {} agents, platform {}",
                    self.config_path,
                    self.repositories.len(),
                    self.agents.len(),
                    if self.platform.is_some() { "present" } else { "absent" }
                );
                self.outcome = LoadOutcome::Loaded { sources };
            }
            Err(error) => {
                warn!("Failed to load configurations: {}", error);
                self.fall_back(FallbackReason::Failed(error));
            }
        }
    }

    fn load_sources(&self) -> Result<LoadedSources, ConfigError> {
        Ok(LoadedSources {
            platform: self.load_platform_config()?,
            repositories: self.load_repositories_config()?,
            agents: self.load_agents_config()?
        })
    }

    fn load_platform_config(&self) -> Result<Option<PlatformConfig>, ConfigError> {
        file_loader::load_platform(&self.config_path)
    }

    fn load_repositories_config(
        &self
    ) -> Result<Option<BTreeMap<String, RepositoryConfig>>, ConfigError> {
        file_loader::load_repositories(&self.config_path)
    }

    fn load_agents_config(&self) -> Result<Option<BTreeMap<String, AgentConfig>>, ConfigError> {
        file_loader::load_agents(&self.config_path)
    }

    /// Replace the resolved state with the environment-derived minimum.
    ///
    /// Clears the platform entity and agents; repositories hold at most the
    /// `default` entry built from `GITHUB_REPOSITORY`.
    pub fn load_from_environment(&mut self) {
        self.platform = None;
        self.agents.clear();
        self.repositories = loader::load_from_environment(self.env.as_ref());
    }

    fn fall_back(&mut self, reason: FallbackReason) {
        self.load_from_environment();
        self.outcome = LoadOutcome::FellBack { reason };
    }

    pub fn platform_config(&self) -> Option<&PlatformConfig> {
        self.platform.as_ref()
    }

    pub fn get_all_repositories(&self) -> &BTreeMap<String, RepositoryConfig> {
        &self.repositories
    }

    pub fn get_all_agents(&self) -> &BTreeMap<String, AgentConfig> {
        &self.agents
    }

    /// Names of repositories agents may act on.
    ///
    /// `repository_access.default_repositories` when the platform declares
    /// it, otherwise every known repository.
    pub fn get_allowed_repositories(&self) -> Vec<String> {
        match self
            .platform
            .as_ref()
            .and_then(|p| p.repository_access.default_repositories.as_ref())
        {
            Some(names) => names.clone(),
            None => self.repositories.keys().cloned().collect()
        }
    }

    pub fn get_repository_config(&self, name: &str) -> Option<&RepositoryConfig> {
        self.repositories.get(name)
    }

    pub fn get_agent_config(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    pub fn get_github_credentials(&self) -> GithubCredentials {
        GithubCredentials {
            token: self.github_token().into_value(),
            user_name: self.github_user_name().into_value(),
            user_email: self.github_user_email().into_value()
        }
    }

    pub fn get_llm_config(&self) -> LlmSettings {
        LlmSettings {
            openai_api_key: self.openai_api_key().into_value(),
            anthropic_api_key: self.anthropic_api_key().into_value(),
            provider: self.llm_provider().into_value(),
            model: self.llm_model().into_value(),
            temperature: self.llm_temperature().into_value(),
            max_tokens: self.llm_max_tokens().into_value(),
            timeout: self.llm_timeout().into_value()
        }
    }

    pub fn get_allowed_file_types(&self) -> Vec<String> {
        self.allowed_file_types().into_value()
    }

    pub fn get_cors_origins(&self) -> Vec<String> {
        self.cors_origins().into_value()
    }

    pub fn get_service_urls(&self) -> ServiceUrls {
        ServiceUrls {
            prometheus: self.prometheus_url().into_value(),
            alertmanager: self.alertmanager_url().into_value(),
            grafana: self.grafana_url().into_value()
        }
    }

    /// True iff `PLATFORM_MODE` is exactly `multi_repo`.
    pub fn is_multi_repo_mode(&self) -> bool {
        self.env.var(vars::PLATFORM_MODE).as_deref() == Some(MULTI_REPO_MODE)
    }

    /// Bootstrap-required variables that are not set.
    pub fn missing_required_env(&self) -> Vec<String> {
        loader::missing_required_env(self.env.as_ref(), &REQUIRED_ENV_VARS)
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            platform_config_loaded: self.platform.is_some(),
            repositories_count: self.repositories.len(),
            agents_count: self.agents.len(),
            multi_repo_mode: self.is_multi_repo_mode(),
            repositories: self.repositories.keys().cloned().collect(),
            agents: self.agents.keys().cloned().collect(),
            config_path: self.config_path.display().to_string(),
            fallback_reason: match &self.outcome {
                LoadOutcome::FellBack { reason } => Some(reason.to_string()),
                _ => None
            }
        }
    }

    /// Every resolved setting as `(key, value, source)`.
    ///
    /// Tokens and API keys are masked.
    pub fn explain(&self) -> Vec<(String, String, String)> {
        let platform_mode = resolve(
            self.env
                .var(vars::PLATFORM_MODE)
                .map(|mode| (vars::PLATFORM_MODE, mode)),
            None,
            || SINGLE_REPO_MODE.to_string()
        );

        vec![
            explained_secret("github.token", &self.github_token()),
            explained("github.user_name", &self.github_user_name()),
            explained("github.user_email", &self.github_user_email()),
            explained_secret("llm.openai_api_key", &self.openai_api_key()),
            explained_secret("llm.anthropic_api_key", &self.anthropic_api_key()),
            explained("llm.provider", &self.llm_provider()),
            explained("llm.model", &self.llm_model()),
            explained("llm.temperature", &self.llm_temperature()),
            explained("llm.max_tokens", &self.llm_max_tokens()),
            explained("llm.timeout", &self.llm_timeout()),
            explained_list("agent_settings.allowed_file_types", &self.allowed_file_types()),
            explained_list("agent_settings.cors_origins", &self.cors_origins()),
            explained("services.prometheus", &self.prometheus_url()),
            explained("services.alertmanager", &self.alertmanager_url()),
            explained("services.grafana", &self.grafana_url()),
            explained("platform_mode", &platform_mode),
        ]
    }

    fn github_section(&self) -> Option<&GithubCredentialsConfig> {
        self.platform.as_ref()?.credentials.github.as_ref()
    }

    fn llm_section(&self) -> Option<&LlmCredentialsConfig> {
        self.platform.as_ref()?.credentials.llm.as_ref()
    }

    fn service_url(&self, name: &str) -> Option<&String> {
        self.platform
            .as_ref()?
            .services
            .get(name)
            .map(|service| &service.url)
    }

    fn github_token(&self) -> Resolved<String> {
        let declared = self.github_section().and_then(|g| g.token.as_ref());
        self.pick_string(&[vars::GITHUB_TOKEN], declared, "")
    }

    fn github_user_name(&self) -> Resolved<String> {
        let declared = self.github_section().and_then(|g| g.user_name.as_ref());
        self.pick_string(&[vars::GITHUB_USER_NAME], declared, "")
    }

    fn github_user_email(&self) -> Resolved<String> {
        let declared = self.github_section().and_then(|g| g.user_email.as_ref());
        self.pick_string(&[vars::GITHUB_USER_EMAIL], declared, "")
    }

    fn openai_api_key(&self) -> Resolved<String> {
        let declared = self.llm_section().and_then(|l| l.openai_api_key.as_ref());
        self.pick_string(&[vars::OPENAI_API_KEY], declared, "")
    }

    fn anthropic_api_key(&self) -> Resolved<String> {
        let declared = self.llm_section().and_then(|l| l.anthropic_api_key.as_ref());
        self.pick_string(&[vars::ANTHROPIC_API_KEY], declared, "")
    }

    fn llm_provider(&self) -> Resolved<String> {
        let declared = self.llm_section().and_then(|l| l.provider.as_ref());
        self.pick_string(&[vars::LLM_PROVIDER], declared, DEFAULT_LLM_PROVIDER)
    }

    fn llm_model(&self) -> Resolved<String> {
        let declared = self.llm_section().and_then(|l| l.model.as_ref());
        self.pick_string(&[vars::LLM_MODEL], declared, DEFAULT_LLM_MODEL)
    }

    fn llm_temperature(&self) -> Resolved<f64> {
        let declared = self.llm_section().and_then(|l| l.temperature);
        self.pick_parsed(vars::LLM_TEMPERATURE, declared, DEFAULT_LLM_TEMPERATURE)
    }

    fn llm_max_tokens(&self) -> Resolved<u32> {
        let declared = self.llm_section().and_then(|l| l.max_tokens);
        self.pick_parsed(vars::LLM_MAX_TOKENS, declared, DEFAULT_LLM_MAX_TOKENS)
    }

    fn llm_timeout(&self) -> Resolved<u64> {
        let declared = self.llm_section().and_then(|l| l.timeout);
        self.pick_parsed(vars::LLM_TIMEOUT, declared, DEFAULT_LLM_TIMEOUT)
    }

    fn allowed_file_types(&self) -> Resolved<Vec<String>> {
        let declared = self
            .platform
            .as_ref()
            .and_then(|p| p.agent_settings.allowed_file_types.as_ref());
        self.pick_list(
            vars::ALLOWED_FILE_TYPES,
            declared,
            &DEFAULT_ALLOWED_FILE_TYPES
        )
    }

    fn cors_origins(&self) -> Resolved<Vec<String>> {
        let declared = self
            .platform
            .as_ref()
            .and_then(|p| p.agent_settings.cors_origins.as_ref());
        self.pick_list(vars::CORS_ORIGINS, declared, &DEFAULT_CORS_ORIGINS)
    }

    fn prometheus_url(&self) -> Resolved<String> {
        self.pick_string(
            &[vars::PROMETHEUS_URL],
            self.service_url("prometheus"),
            DEFAULT_PROMETHEUS_URL
        )
    }

    fn alertmanager_url(&self) -> Resolved<String> {
        self.pick_string(
            &[vars::ALERTMANAGER_URL, vars::ALERTMANAGER_URL_LEGACY],
            self.service_url("alertmanager"),
            DEFAULT_ALERTMANAGER_URL
        )
    }

    fn grafana_url(&self) -> Resolved<String> {
        self.pick_string(
            &[vars::GRAFANA_URL],
            self.service_url("grafana"),
            DEFAULT_GRAFANA_URL
        )
    }

    fn first_env(&self, keys: &[&'static str]) -> Option<(&'static str, String)> {
        keys.iter()
            .find_map(|key| loader::env_value(self.env.as_ref(), key).map(|value| (*key, value)))
    }

    fn pick_string(
        &self,
        keys: &[&'static str],
        declared: Option<&String>,
        default: &str
    ) -> Resolved<String> {
        resolve(self.first_env(keys), declared.cloned(), || {
            default.to_string()
        })
    }

    fn pick_parsed<T>(&self, key: &'static str, declared: Option<T>, default: T) -> Resolved<T>
    where
        T: FromStr,
        T::Err: fmt::Display
    {
        let from_env = match loader::parse_env::<T>(self.env.as_ref(), key) {
            Ok(value) => value.map(|value| (key, value)),
            Err(error) => {
                warn!("Ignoring environment override: {}", error);
                None
            }
        };
        resolve(from_env, declared, || default)
    }

    fn pick_list(
        &self,
        key: &'static str,
        declared: Option<&Vec<String>>,
        default: &[&str]
    ) -> Resolved<Vec<String>> {
        resolve(
            loader::list_env(self.env.as_ref(), key).map(|items| (key, items)),
            declared.cloned(),
            || default.iter().map(|item| (*item).to_string()).collect()
        )
    }
}

fn explained<T: fmt::Display>(key: &str, resolved: &Resolved<T>) -> (String, String, String) {
    (
        key.to_string(),
        resolved.value.to_string(),
        resolved.source.to_string()
    )
}

fn explained_secret(key: &str, resolved: &Resolved<String>) -> (String, String, String) {
    let value = if resolved.value.is_empty() {
        String::new()
    } else {
        MASKED.to_string()
    };
    (key.to_string(), value, resolved.source.to_string())
}

fn explained_list(key: &str, resolved: &Resolved<Vec<String>>) -> (String, String, String) {
    (
        key.to_string(),
        resolved.value.join(","),
        resolved.source.to_string()
    )
}
