//! # Declarative Source Loading
//!
//! Reads the three YAML sources under the configuration root and decodes
//! them into typed entities.
//!
//! Each loader returns `Ok(None)` when its file does not exist: an absent
//! source contributes nothing and is not an error. Unreadable files,
//! invalid YAML, empty documents, strict-decode failures and validation
//! failures are all reported as [`ConfigError`].

use crate::config::{AgentConfig, PlatformConfig, RepositoryConfig};
use crate::validator::{validate_entity, validate_platform};
use errors::ConfigError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Platform-wide source.
pub const PLATFORM_FILE: &str = "platform.yml";

/// Repository declarations, under `target_repositories`.
pub const REPOSITORIES_FILE: &str = "repositories.yml";

/// Agent declarations, under `platform_agents`.
pub const AGENTS_FILE: &str = "agents.yml";

#[derive(Debug, Deserialize)]
struct RepositoriesFile {
    #[serde(default)]
    target_repositories: Option<BTreeMap<String, RepositoryConfig>>
}

#[derive(Debug, Deserialize)]
struct AgentsFile {
    #[serde(default)]
    platform_agents: Option<BTreeMap<String, AgentConfig>>
}

/// Returns true if any of the three declarative sources exists in `dir`.
pub fn any_source_exists(dir: &Path) -> bool {
    [PLATFORM_FILE, REPOSITORIES_FILE, AGENTS_FILE]
        .iter()
        .any(|file| dir.join(file).exists())
}

/// Load `platform.yml`.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Decodes exactly one [`PlatformConfig`] from the top-level fields of the
/// platform source. Unknown top-level fields and missing `name`, `version`
/// or `environment` are errors.
///
/// ## Usage
/// ```rust,no_run
/// use config::file_loader::load_platform;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     if let Some(platform) = load_platform(Path::new("/config"))? {
///         println!("Platform: {} {}", platform.name, platform.version);
///     }
///     Ok(())
/// }
/// ```
pub fn load_platform(dir: &Path) -> Result<Option<PlatformConfig>, ConfigError> {
    let Some(platform) = read_yaml::<PlatformConfig>(dir, PLATFORM_FILE)? else {
        return Ok(None);
    };
    validate_platform(PLATFORM_FILE, &platform)?;

    info!(
        "Loaded {} ({} {}, environment {})",
        PLATFORM_FILE, platform.name, platform.version, platform.environment
    );
    Ok(Some(platform))
}

/// Load `repositories.yml`.
///
/// Each entry under `target_repositories` becomes one [`RepositoryConfig`]
/// whose `name` is the mapping key. A file without that key yields an
/// empty map.
pub fn load_repositories(
    dir: &Path
) -> Result<Option<BTreeMap<String, RepositoryConfig>>, ConfigError> {
    let Some(file) = read_yaml::<RepositoriesFile>(dir, REPOSITORIES_FILE)? else {
        return Ok(None);
    };

    let mut repositories = file.target_repositories.unwrap_or_default();
    for (name, repo) in &mut repositories {
        repo.name.clone_from(name);
        validate_entity(REPOSITORIES_FILE, name, &*repo)?;
    }

    info!(
        "Loaded {} repositories from {}",
        repositories.len(),
        REPOSITORIES_FILE
    );
    Ok(Some(repositories))
}

/// Load `agents.yml`.
///
/// Symmetric to [`load_repositories`], reading `platform_agents`.
pub fn load_agents(dir: &Path) -> Result<Option<BTreeMap<String, AgentConfig>>, ConfigError> {
    let Some(file) = read_yaml::<AgentsFile>(dir, AGENTS_FILE)? else {
        return Ok(None);
    };

    let mut agents = file.platform_agents.unwrap_or_default();
    for (name, agent) in &mut agents {
        agent.name.clone_from(name);
        validate_entity(AGENTS_FILE, name, &*agent)?;
    }

    info!("Loaded {} agents from {}", agents.len(), AGENTS_FILE);
    Ok(Some(agents))
}

fn read_yaml<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<Option<T>, ConfigError> {
    let path = dir.join(file_name);
    if !path.exists() {
        debug!("Source {:?} not present", path);
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::SourceRead {
        source_name: file_name.to_string(),
        reason: e.to_string()
    })?;

    let document: serde_yaml::Value =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::SourceParse {
            source_name: file_name.to_string(),
            reason: e.to_string()
        })?;

    if document.is_null() {
        return Err(ConfigError::EmptySource {
            source_name: file_name.to_string()
        });
    }

    let decoded = serde_yaml::from_value(document).map_err(|e| ConfigError::SourceParse {
        source_name: file_name.to_string(),
        reason: e.to_string()
    })?;

    Ok(Some(decoded))
}
