//! # CONSTRUCTION PIPELINE
//!
//! Drives one component through the interceptor chain:
//!
//! ```text
//! Start ──substitute──▶ MaybeSubstituted ──────────────────────────────▶ Done
//!   │
//!   └─default instantiation─▶ Instantiated ──veto──────────────────────▶ Done
//!                                  │
//!                                  └──▶ MaybePopulated ──(suppress | set)──▶ Done
//!
//! any failure ──▶ Aborted
//! ```
//!
//! Each phase is a plain loop over the frozen chain that stops at the first decisive
//! result. Passes are independent: the chain is shared, everything else is pass-local.

use crate::config::PipelineConfig;
use crate::container::Container;
use crate::errors::{error_codes, ConstructionError, ContainerError, PipelineError};
use crate::interceptor::{Interceptor, InterceptorError, Phase, PhaseResult, PropertyOutcome};
use crate::registry::{InterceptorChain, InterceptorRegistry};
use crate::types::{ComponentDescriptor, Instance, PropertyDescriptor, PropertySet};
use std::sync::Arc;

/// States of a single construction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionState {
    Start,
    MaybeSubstituted,
    Instantiated,
    MaybePopulated,
    Done,
    Aborted,
}

/// What the container should do about property population.
#[derive(Debug, Clone, PartialEq)]
pub enum Population {
    /// Apply this set.
    Apply(PropertySet),
    /// An after-instantiation callback vetoed population.
    Skipped,
    /// A legacy property callback returned no set.
    Suppressed,
    /// The instance is a substitute; population never applied.
    Bypassed,
}

/// Terminal result of [`ConstructionPipeline::construct`].
#[derive(Debug, Clone)]
pub struct ConstructionOutcome {
    pub instance: Instance,
    pub substituted: bool,
    pub population: Population,
}

impl ConstructionOutcome {
    /// Property set to apply, if population goes ahead.
    pub fn properties(&self) -> Option<&PropertySet> {
        match &self.population {
            Population::Apply(properties) => Some(properties),
            _ => None,
        }
    }
}

// Data carried between transitions.
enum Stage {
    Start { properties: PropertySet },
    MaybeSubstituted { substitute: Instance },
    Instantiated { instance: Instance, properties: PropertySet },
    MaybePopulated { instance: Instance, properties: PropertySet },
    Done(ConstructionOutcome),
}

impl Stage {
    fn state(&self) -> ConstructionState {
        match self {
            Stage::Start { .. } => ConstructionState::Start,
            Stage::MaybeSubstituted { .. } => ConstructionState::MaybeSubstituted,
            Stage::Instantiated { .. } => ConstructionState::Instantiated,
            Stage::MaybePopulated { .. } => ConstructionState::MaybePopulated,
            Stage::Done(_) => ConstructionState::Done,
        }
    }
}

/// Descriptors for the legacy callback, resolved on first use.
struct LazyDescriptors<F> {
    resolver: Option<F>,
    resolved: Option<Vec<PropertyDescriptor>>,
}

impl<F> LazyDescriptors<F>
where
    F: FnOnce() -> Result<Vec<PropertyDescriptor>, ContainerError>,
{
    fn new(resolver: F) -> Self {
        Self {
            resolver: Some(resolver),
            resolved: None,
        }
    }

    fn get(&mut self) -> Result<&[PropertyDescriptor], ContainerError> {
        if self.resolved.is_none() {
            let descriptors = match self.resolver.take() {
                Some(resolve) => resolve()?,
                None => Vec::new(),
            };
            self.resolved = Some(descriptors);
        }
        Ok(self.resolved.as_deref().unwrap_or(&[]))
    }
}

fn interceptor_failure(
    phase: Phase,
    interceptor: &Arc<dyn Interceptor>,
    component: &str,
    source: InterceptorError,
) -> PipelineError {
    ConstructionError {
        phase,
        interceptor: interceptor.name().to_string(),
        component: component.to_string(),
        source,
    }
    .into()
}

/// **CONSTRUCTION PIPELINE**
///
/// **PURPOSE**: Apply a frozen interceptor chain to component constructions
/// **GUARANTEE**: `Send + Sync`; any number of passes may run concurrently
#[derive(Debug, Clone, Default)]
pub struct ConstructionPipeline {
    chain: InterceptorChain,
    config: PipelineConfig,
}

impl ConstructionPipeline {
    pub fn new(chain: InterceptorChain, config: PipelineConfig) -> Self {
        Self { chain, config }
    }

    /// Freeze `registry` and build a pipeline over its chain.
    pub fn from_registry(registry: &InterceptorRegistry) -> Self {
        Self::new(registry.freeze(), registry.config().clone())
    }

    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether the before-instantiation phase runs for `descriptor` at all.
    pub fn applies_before_instantiation(&self, descriptor: &ComponentDescriptor) -> bool {
        descriptor.has_concrete_type() && !(self.config.skip_synthetic && descriptor.is_synthetic())
    }

    /// **BEFORE INSTANTIATION**
    ///
    /// **RETURNS**:
    /// - `Ok(Some(instance))` - First substitute produced; later interceptors were not asked
    /// - `Ok(None)` - Proceed with default instantiation
    /// - `Err(PipelineError::Validation)` - `descriptor` has no concrete implementation type
    pub fn run_before_instantiation(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<Instance>, PipelineError> {
        if !descriptor.has_concrete_type() {
            return Err(PipelineError::Validation {
                code: error_codes::PRECONDITION_NO_CONCRETE_TYPE.to_string(),
                message: format!(
                    "Component '{}' is produced by a factory method; before-instantiation does not apply",
                    descriptor.name()
                ),
            });
        }

        match self.before_instantiation_phase(descriptor)? {
            PhaseResult::Substitute(substitute) => Ok(Some(substitute)),
            _ => Ok(None),
        }
    }

    /// **AFTER INSTANTIATION**
    ///
    /// Returns `false` when some interceptor vetoed property population.
    pub fn run_after_instantiation(&self, instance: &Instance, name: &str) -> Result<bool, PipelineError> {
        let result = self.after_instantiation_phase(instance, name)?;
        Ok(!matches!(result, PhaseResult::Suppress))
    }

    /// **PROPERTY INTERCEPTION**
    ///
    /// **PARAMETERS**:
    /// - `properties` - Set proposed by the container
    /// - `descriptors` - Called at most once, and only if some interceptor falls back to
    ///   its legacy callback
    ///
    /// **RETURNS**: The final set, or `None` when population is suppressed
    pub fn run_property_interception<F>(
        &self,
        properties: PropertySet,
        instance: &Instance,
        name: &str,
        descriptors: F,
    ) -> Result<Option<PropertySet>, PipelineError>
    where
        F: FnOnce() -> Result<Vec<PropertyDescriptor>, ContainerError>,
    {
        let mut descriptors = LazyDescriptors::new(descriptors);
        let mut working = properties;

        for interceptor in self.chain.iter() {
            let step = match self.current_properties_step(interceptor, &working, instance, name)? {
                PhaseResult::Defer => {
                    log::trace!(
                        "Interceptor '{}' deferred to legacy property callback for '{}'",
                        interceptor.name(),
                        name
                    );
                    let resolved = descriptors.get()?;
                    self.legacy_properties_step(interceptor, &working, resolved, instance, name)?
                }
                other => other,
            };

            match step {
                PhaseResult::Rewrite(rewritten) => working = rewritten,
                PhaseResult::Suppress => {
                    log::debug!(
                        "Interceptor '{}' suppressed property population for '{}'",
                        interceptor.name(),
                        name
                    );
                    return Ok(None);
                }
                _ => {}
            }
        }

        Ok(Some(working))
    }

    /// **FULL CONSTRUCTION PASS**
    ///
    /// Runs the state machine to `Done`, calling back into `container` for default
    /// instantiation and property descriptors. Property application and initialization
    /// stay with the caller, see [`crate::container::create_component`].
    pub fn construct<C>(
        &self,
        container: &C,
        descriptor: &ComponentDescriptor,
        properties: PropertySet,
    ) -> Result<ConstructionOutcome, PipelineError>
    where
        C: Container + ?Sized,
    {
        if self.chain.is_empty() {
            let instance = container.default_instantiate(descriptor)?;
            return Ok(ConstructionOutcome {
                instance,
                substituted: false,
                population: Population::Apply(properties),
            });
        }

        let mut stage = Stage::Start { properties };
        loop {
            let from = stage.state();
            stage = match self.advance(stage, container, descriptor) {
                Ok(Stage::Done(outcome)) => return Ok(outcome),
                Ok(next) => {
                    log::trace!("'{}': {:?} -> {:?}", descriptor.name(), from, next.state());
                    next
                }
                Err(err) => {
                    log::warn!(
                        "'{}': {:?} -> {:?}: {}",
                        descriptor.name(),
                        from,
                        ConstructionState::Aborted,
                        err
                    );
                    return Err(err);
                }
            };
        }
    }

    fn advance<C>(
        &self,
        stage: Stage,
        container: &C,
        descriptor: &ComponentDescriptor,
    ) -> Result<Stage, PipelineError>
    where
        C: Container + ?Sized,
    {
        let name = descriptor.name();
        match stage {
            Stage::Start { properties } => {
                if self.applies_before_instantiation(descriptor) {
                    if let PhaseResult::Substitute(substitute) = self.before_instantiation_phase(descriptor)? {
                        return Ok(Stage::MaybeSubstituted { substitute });
                    }
                }
                let instance = container.default_instantiate(descriptor)?;
                Ok(Stage::Instantiated { instance, properties })
            }
            Stage::MaybeSubstituted { substitute } => Ok(Stage::Done(ConstructionOutcome {
                instance: substitute,
                substituted: true,
                population: Population::Bypassed,
            })),
            Stage::Instantiated { instance, properties } => {
                match self.after_instantiation_phase(&instance, name)? {
                    PhaseResult::Suppress => Ok(Stage::Done(ConstructionOutcome {
                        instance,
                        substituted: false,
                        population: Population::Skipped,
                    })),
                    _ => Ok(Stage::MaybePopulated { instance, properties }),
                }
            }
            Stage::MaybePopulated { instance, properties } => {
                let population = match self.run_property_interception(properties, &instance, name, || {
                    container.property_descriptors(descriptor)
                })? {
                    Some(properties) => Population::Apply(properties),
                    None => Population::Suppressed,
                };
                Ok(Stage::Done(ConstructionOutcome {
                    instance,
                    substituted: false,
                    population,
                }))
            }
            done @ Stage::Done(_) => Ok(done),
        }
    }

    fn before_instantiation_phase(&self, descriptor: &ComponentDescriptor) -> Result<PhaseResult, PipelineError> {
        let name = descriptor.name();
        for interceptor in self.chain.iter() {
            log::trace!("before-instantiation: '{}' on '{}'", interceptor.name(), name);
            let substitute = interceptor
                .before_instantiation(descriptor.target(), name)
                .map_err(|e| interceptor_failure(Phase::BeforeInstantiation, interceptor, name, e))?;

            if let Some(substitute) = substitute {
                log::debug!("Interceptor '{}' substituted '{}'", interceptor.name(), name);
                return Ok(PhaseResult::Substitute(substitute));
            }
        }
        Ok(PhaseResult::Continue)
    }

    fn after_instantiation_phase(&self, instance: &Instance, name: &str) -> Result<PhaseResult, PipelineError> {
        for interceptor in self.chain.iter() {
            log::trace!("after-instantiation: '{}' on '{}'", interceptor.name(), name);
            let proceed = interceptor
                .after_instantiation(instance, name)
                .map_err(|e| interceptor_failure(Phase::AfterInstantiation, interceptor, name, e))?;

            if !proceed {
                log::debug!("Interceptor '{}' skipped property population for '{}'", interceptor.name(), name);
                return Ok(PhaseResult::Suppress);
            }
        }
        Ok(PhaseResult::Continue)
    }

    fn current_properties_step(
        &self,
        interceptor: &Arc<dyn Interceptor>,
        properties: &PropertySet,
        instance: &Instance,
        name: &str,
    ) -> Result<PhaseResult, PipelineError> {
        log::trace!("properties: '{}' on '{}'", interceptor.name(), name);
        let outcome = interceptor
            .intercept_properties(properties, instance, name)
            .map_err(|e| interceptor_failure(Phase::Properties, interceptor, name, e))?;

        Ok(match outcome {
            PropertyOutcome::Handled(rewritten) => PhaseResult::Rewrite(rewritten),
            PropertyOutcome::NotHandled => PhaseResult::Defer,
        })
    }

    #[allow(deprecated)]
    fn legacy_properties_step(
        &self,
        interceptor: &Arc<dyn Interceptor>,
        properties: &PropertySet,
        descriptors: &[PropertyDescriptor],
        instance: &Instance,
        name: &str,
    ) -> Result<PhaseResult, PipelineError> {
        let values = interceptor
            .intercept_property_values(properties, descriptors, instance, name)
            .map_err(|e| interceptor_failure(Phase::LegacyProperties, interceptor, name, e))?;

        Ok(match values {
            Some(rewritten) => PhaseResult::Rewrite(rewritten),
            None => PhaseResult::Suppress,
        })
    }
}
