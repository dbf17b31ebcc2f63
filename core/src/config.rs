//! # PIPELINE CONFIGURATION
//!
//! **PURPOSE**: Knobs the container sets once, before registering interceptors
//! **FORMAT**: JSON, every field optional

use crate::errors::{error_codes, PipelineError};
use serde::{Deserialize, Serialize};

/// What `register` does once the registry has been frozen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateRegistrationPolicy {
    /// Fail the registration.
    #[default]
    Reject,
    /// Hold the interceptor for the next registry generation.
    Queue,
}

/// **PIPELINE CONFIGURATION**
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// **LATE REGISTRATION** - Behaviour of `register` after freezing
    pub late_registration: LateRegistrationPolicy,

    /// **SKIP SYNTHETIC** - Never offer container-internal components for substitution
    pub skip_synthetic: bool,

    /// **CAPACITY** - Optional upper bound on registered interceptors
    pub max_interceptors: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            late_registration: LateRegistrationPolicy::Reject,
            skip_synthetic: true,
            max_interceptors: None,
        }
    }
}

impl PipelineConfig {
    /// **JSON LOADER**
    ///
    /// **RETURNS**:
    /// - `Ok(PipelineConfig)` - Missing fields take their defaults
    /// - `Err(PipelineError::Config)` - Malformed document or unknown enum value
    pub fn from_json(document: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(document).map_err(|e| PipelineError::Config {
            code: error_codes::CONFIG_INVALID.to_string(),
            message: format!("Invalid pipeline configuration: {}", e),
        })
    }

    pub fn with_late_registration(mut self, policy: LateRegistrationPolicy) -> Self {
        self.late_registration = policy;
        self
    }

    pub fn with_max_interceptors(mut self, limit: usize) -> Self {
        self.max_interceptors = Some(limit);
        self
    }
}
