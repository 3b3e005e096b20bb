//! # Configuration Precedence
//!
//! Every accessor resolves its value through the same three tiers.
//!
//! # Precedence Order
//! 1. Environment variable (highest priority)
//! 2. Value declared in `platform.yml`
//! 3. Hardcoded default (lowest priority)
//!
//! Files declare intent, the environment overrides them without editing
//! files, and defaults guarantee a value is always available.

use std::fmt;
use tracing::debug;

/// Tier a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    EnvVar(String),
    PlatformFile,
    Default
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{name}"),
            ValueSource::PlatformFile => write!(f, "platform.yml"),
            ValueSource::Default => write!(f, "default")
        }
    }
}

/// A value together with the tier that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Pick the first available tier.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Applies the fixed environment > platform > default order. The default
/// is only computed when neither higher tier supplies a value.
///
/// ## Usage
/// ```rust
/// use config::precedence::{ValueSource, resolve};
///
/// let model = resolve(None, Some("gpt-4o".to_string()), || "gpt-4".to_string());
/// assert_eq!(model.value, "gpt-4o");
/// assert_eq!(model.source, ValueSource::PlatformFile);
/// ```
pub fn resolve<T>(
    env: Option<(&str, T)>,
    platform: Option<T>,
    default: impl FnOnce() -> T
) -> Resolved<T> {
    if let Some((key, value)) = env {
        debug!("Using environment override {}", key);
        return Resolved::new(value, ValueSource::EnvVar(key.to_string()));
    }

    if let Some(value) = platform {
        return Resolved::new(value, ValueSource::PlatformFile);
    }

    Resolved::new(default(), ValueSource::Default)
}
