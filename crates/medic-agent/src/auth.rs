//! API key resolution for the cloud backend
//!
//! Priority:
//! 1. `ApiKey` from the model configuration
//! 2. MEDIC_API_KEY
//! 3. OPENAI_API_KEY

use std::env;

const KEY_ENV_VARS: &[&str] = &["MEDIC_API_KEY", "OPENAI_API_KEY"];

/// Resolve the bearer token for the cloud backend
///
/// Returns `None` when nothing is configured. That is not an error here: the
/// request is still sent and the backend's rejection degrades to an empty
/// suggestion like any other failure.
pub fn resolve_api_key(configured: Option<&str>) -> Option<String> {
    if let Some(key) = configured.filter(|k| !k.trim().is_empty()) {
        return Some(key.to_string());
    }

    for var in KEY_ENV_VARS {
        if let Ok(key) = env::var(var) {
            if !key.trim().is_empty() {
                tracing::info!("Using {} for cloud model backend", var);
                return Some(key);
            }
        }
    }

    tracing::warn!(
        "No API key for cloud model backend. Set ApiKey in the config, or MEDIC_API_KEY / OPENAI_API_KEY"
    );
    None
}
