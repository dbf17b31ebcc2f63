//! # INTERCEPTOR REGISTRY
//!
//! **LIFECYCLE**: Interceptors are registered during container configuration, then the
//! registry is frozen into an [`InterceptorChain`]. Every construction iterates that chain.
//!
//! **ORDERING**: Registration order, for all four phases. Any precedence sorting is up to
//! the container before it registers.
//!
//! **CONCURRENCY**: The staging list sits behind a `parking_lot::Mutex` that is only taken
//! at configuration time. The frozen chain lives in a `OnceCell` and is read without locks.

use crate::config::{LateRegistrationPolicy, PipelineConfig};
use crate::errors::{error_codes, PipelineError};
use crate::interceptor::Interceptor;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// **FROZEN INTERCEPTOR CHAIN**
///
/// Immutable, ordered snapshot of the registry. Cloning only bumps a reference count.
#[derive(Clone)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Interceptor>> {
        self.interceptors.iter()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.interceptors.iter().map(|i| i.name().to_string()).collect()
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.interceptors.iter().map(|i| i.name())).finish()
    }
}

/// Result of a successful [`InterceptorRegistry::register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Part of the chain that will be frozen.
    Active,
    /// Registry already frozen; held for [`InterceptorRegistry::next_generation`].
    Queued,
}

/// Append-only registry of construction interceptors.
pub struct InterceptorRegistry {
    staged: Mutex<Vec<Arc<dyn Interceptor>>>,
    queued: Mutex<Vec<Arc<dyn Interceptor>>>,
    frozen: OnceCell<InterceptorChain>,
    config: PipelineConfig,
}

impl InterceptorRegistry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            staged: Mutex::new(Vec::new()),
            queued: Mutex::new(Vec::new()),
            frozen: OnceCell::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// **REGISTER INTERCEPTOR**
    ///
    /// Appends to the chain while the registry is open. Once frozen, the configured
    /// [`LateRegistrationPolicy`] decides between rejecting and queueing.
    pub fn register(&self, interceptor: Arc<dyn Interceptor>) -> Result<Registration, PipelineError> {
        // Lock order: staged, then queued.
        let mut staged = self.staged.lock();
        let mut queued = self.queued.lock();

        if self.frozen.get().is_none() {
            self.check_capacity(interceptor.as_ref(), staged.len())?;
            log::debug!("Registered interceptor '{}' at position {}", interceptor.name(), staged.len());
            staged.push(interceptor);
            return Ok(Registration::Active);
        }

        match self.config.late_registration {
            LateRegistrationPolicy::Reject => Err(PipelineError::Registry {
                code: error_codes::REGISTRY_FROZEN.to_string(),
                message: format!(
                    "Cannot register '{}': registry is frozen and serving constructions",
                    interceptor.name()
                ),
            }),
            LateRegistrationPolicy::Queue => {
                // The next generation holds the frozen chain plus everything queued.
                self.check_capacity(interceptor.as_ref(), staged.len() + queued.len())?;
                log::warn!(
                    "Registry frozen; interceptor '{}' queued for the next generation",
                    interceptor.name()
                );
                queued.push(interceptor);
                Ok(Registration::Queued)
            }
        }
    }

    fn check_capacity(&self, interceptor: &dyn Interceptor, current: usize) -> Result<(), PipelineError> {
        match self.config.max_interceptors {
            Some(limit) if current >= limit => Err(PipelineError::Registry {
                code: error_codes::REGISTRY_CAPACITY_EXCEEDED.to_string(),
                message: format!(
                    "Cannot register '{}': limit of {} interceptors reached",
                    interceptor.name(),
                    limit
                ),
            }),
            _ => Ok(()),
        }
    }

    /// **FREEZE**
    ///
    /// Finalizes registration. Idempotent: later calls return the same chain.
    pub fn freeze(&self) -> InterceptorChain {
        if let Some(chain) = self.frozen.get() {
            return chain.clone();
        }
        // Held until the cell is published so `register` never sees a half-frozen registry.
        let staged = self.staged.lock();
        self.frozen
            .get_or_init(|| {
                log::debug!("Freezing interceptor registry with {} interceptors", staged.len());
                InterceptorChain::new(staged.clone())
            })
            .clone()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get().is_some()
    }

    /// Fresh, open registry holding the frozen chain followed by any queued interceptors.
    ///
    /// Freezes this registry first if it was still open.
    pub fn next_generation(&self) -> InterceptorRegistry {
        let chain = self.freeze();
        let queued = self.queued.lock();

        let mut interceptors: Vec<Arc<dyn Interceptor>> = chain.iter().cloned().collect();
        interceptors.extend(queued.iter().cloned());

        InterceptorRegistry {
            staged: Mutex::new(interceptors),
            queued: Mutex::new(Vec::new()),
            frozen: OnceCell::new(),
            config: self.config.clone(),
        }
    }

    /// Number of interceptors in (or destined for) the live chain.
    pub fn len(&self) -> usize {
        self.staged.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn queued_len(&self) -> usize {
        self.queued.lock().len()
    }

    /// Registered interceptor names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.staged.lock().iter().map(|i| i.name().to_string()).collect()
    }
}

impl Default for InterceptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
