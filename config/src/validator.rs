//! # Entity Validation
//!
//! Structural checks run after a source decodes, using the `validator`
//! crate. A failure here is reported as a malformed source, exactly like a
//! decode failure.

use crate::config::PlatformConfig;
use errors::ConfigError;
use validator::Validate;

/// Validate one decoded entity, naming it in the error.
///
/// ## Validation Rules
/// ### Repository
/// - `name`, `github_url`, `health_endpoint`: non-empty
/// - `port`: 1-65535
///
/// ### Agent
/// - `name`: non-empty
/// - `port`: 1-65535 when `enabled`
pub fn validate_entity<T: Validate>(
    source_name: &str,
    label: &str,
    entity: &T
) -> Result<(), ConfigError> {
    entity.validate().map_err(|e| ConfigError::SourceInvalid {
        source_name: source_name.to_string(),
        reason: format!("{label}: {e}")
    })
}

/// Validate the platform entity.
///
/// Besides the derived rules (non-empty `name`), every declared service
/// must carry a non-empty `url`.
pub fn validate_platform(source_name: &str, platform: &PlatformConfig) -> Result<(), ConfigError> {
    validate_entity(source_name, "platform", platform)?;

    if let Some((name, _)) = platform
        .services
        .iter()
        .find(|(_, service)| service.url.trim().is_empty())
    {
        return Err(ConfigError::SourceInvalid {
            source_name: source_name.to_string(),
            reason: format!("service `{name}` has an empty url")
        });
    }

    Ok(())
}
