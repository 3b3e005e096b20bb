//! # Agent Platform Configuration
//!
//! Resolves runtime configuration for the multi-agent platform from layered
//! declarative sources and environment variables.
//!
//! This crate provides:
//! - Typed entities for repositories, agents and the platform
//! - All-or-nothing loading of `platform.yml`, `repositories.yml` and
//!   `agents.yml` from a configuration root
//! - An environment fallback when sources are absent or invalid
//! - Accessors with environment > platform > default precedence
//! - Provenance for every resolved setting
//! - A process-wide instance installed once at startup
//!
//! # Example
//!
//! ```rust,no_run
//! use config::CentralizedConfig;
//!
//! let config = config::global::init(CentralizedConfig::load("/config"));
//! for name in config.get_allowed_repositories() {
//!     println!("allowed: {name}");
//! }
//! ```

pub mod config;
pub mod file_loader;
pub mod global;
pub mod loader;
pub mod precedence;
pub mod resolver;
pub mod validator;

pub use config::{
    AgentConfig, AgentSettings, CredentialsConfig, GithubCredentialsConfig, LlmCredentialsConfig,
    PlatformConfig, RepositoryAccess, RepositoryConfig, ServiceConfig
};
pub use errors::ConfigError;
pub use loader::{EnvSource, ProcessEnv, load_from_environment};
pub use precedence::{Resolved, ValueSource};
pub use resolver::{
    CentralizedConfig, ConfigSummary, DEFAULT_CONFIG_PATH, FallbackReason, GithubCredentials,
    LlmSettings, LoadOutcome, ServiceUrls
};
