//! # PIPELINE ERROR TYPES
//!
//! **TAXONOMY**: Interceptor failures surface as [`ConstructionError`], failures raised by
//! the container's own operations as [`ContainerError`]. Both are carried by the crate-wide
//! [`PipelineError`] alongside registry, validation and configuration failures.
//!
//! **PROPAGATION**: No local recovery or retry. The first error aborts the construction pass.

use crate::interceptor::{InterceptorError, Phase};
use thiserror::Error;

/// **STABLE ERROR CODES**
pub mod error_codes {
    pub const REGISTRY_FROZEN: &str = "CONSTRUCT_REGISTRY_FROZEN";
    pub const REGISTRY_CAPACITY_EXCEEDED: &str = "CONSTRUCT_REGISTRY_CAPACITY_EXCEEDED";
    pub const PRECONDITION_NO_CONCRETE_TYPE: &str = "CONSTRUCT_PRECONDITION_NO_CONCRETE_TYPE";
    pub const CONFIG_INVALID: &str = "CONSTRUCT_CONFIG_INVALID";
    pub const INSTANTIATION_FAILED: &str = "CONSTRUCT_CONTAINER_INSTANTIATION_FAILED";
    pub const PROPERTY_APPLICATION_FAILED: &str = "CONSTRUCT_CONTAINER_PROPERTY_APPLICATION_FAILED";
    pub const DESCRIPTOR_RESOLUTION_FAILED: &str = "CONSTRUCT_CONTAINER_DESCRIPTOR_RESOLUTION_FAILED";
    pub const INITIALIZATION_FAILED: &str = "CONSTRUCT_CONTAINER_INITIALIZATION_FAILED";
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("REGISTRY ERROR: {code} - {message}")]
    Registry { code: String, message: String },

    #[error("VALIDATION ERROR: {code} - {message}")]
    Validation { code: String, message: String },

    #[error("CONFIG ERROR: {code} - {message}")]
    Config { code: String, message: String },
}

impl PipelineError {
    /// Stable code of the error, when it carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            PipelineError::Construction(_) => None,
            PipelineError::Container(err) => Some(&err.code),
            PipelineError::Registry { code, .. }
            | PipelineError::Validation { code, .. }
            | PipelineError::Config { code, .. } => Some(code),
        }
    }

    /// Phase in which an interceptor failed, if this is an interceptor failure.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PipelineError::Construction(err) => Some(err.phase),
            _ => None,
        }
    }
}

/// **INTERCEPTOR FAILURE**
///
/// Tagged with the phase and the identity of the interceptor that raised it, plus the name
/// of the component whose construction was aborted.
#[derive(Debug, Error)]
#[error("CONSTRUCTION ERROR: interceptor '{interceptor}' failed during {phase} of '{component}': {source}")]
pub struct ConstructionError {
    pub phase: Phase,
    pub interceptor: String,
    pub component: String,
    #[source]
    pub source: InterceptorError,
}

/// **CONTAINER FAILURE**
///
/// Raised by the container's own instantiation, population and initialization steps.
/// The pipeline passes it through untouched.
#[derive(Debug, Error)]
#[error("CONTAINER ERROR: {code} - {message}")]
pub struct ContainerError {
    pub code: String,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ContainerError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }
}
