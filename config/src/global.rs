//! # Process-wide Instance
//!
//! One resolved configuration per process, installed eagerly at startup.
//!
//! Prefer passing the `Arc` returned by [`init`] into collaborators
//! directly. [`get`] is for code that cannot be reached that way; it returns
//! `None` until startup has installed the instance.

use crate::resolver::CentralizedConfig;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static INSTANCE: OnceLock<Arc<CentralizedConfig>> = OnceLock::new();

/// Install `config` as the process-wide instance.
///
/// The first call wins; later calls drop their argument and return the
/// instance already installed.
pub fn init(config: CentralizedConfig) -> Arc<CentralizedConfig> {
    Arc::clone(INSTANCE.get_or_init(|| {
        debug!("Installing process-wide configuration");
        Arc::new(config)
    }))
}

/// Load from `config_path` and install, unless an instance already exists.
pub fn init_from_path(config_path: impl Into<PathBuf>) -> Arc<CentralizedConfig> {
    Arc::clone(INSTANCE.get_or_init(|| Arc::new(CentralizedConfig::load(config_path))))
}

pub fn get() -> Option<Arc<CentralizedConfig>> {
    INSTANCE.get().cloned()
}
