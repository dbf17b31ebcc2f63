//! # CONTAINER INTEGRATION
//!
//! The [`Container`] trait is the surface the owning container exposes to the pipeline.
//! [`create_component`] runs one full construction against it: interceptor phases, then
//! property application and the container's own initialization hooks.

pub mod factory;

pub use factory::{ComponentFactory, FactoryContainer};

use crate::errors::{ContainerError, PipelineError};
use crate::pipeline::{ConstructionOutcome, ConstructionPipeline, Population};
use crate::types::{ComponentDescriptor, Instance, PropertyDescriptor, PropertySet};

/// **CONTAINER COLLABORATOR**
///
/// **MANDATE**: Errors raised here are surfaced to the caller unchanged.
pub trait Container {
    /// Build the default instance for `descriptor`.
    ///
    /// Only called when no interceptor substituted the component.
    fn default_instantiate(&self, descriptor: &ComponentDescriptor) -> Result<Instance, ContainerError>;

    /// Apply the final property set to a freshly built instance.
    fn apply_properties(&self, instance: &Instance, properties: &PropertySet) -> Result<(), ContainerError>;

    /// Property descriptors of the target, for legacy property callbacks.
    fn property_descriptors(
        &self,
        _descriptor: &ComponentDescriptor,
    ) -> Result<Vec<PropertyDescriptor>, ContainerError> {
        Ok(Vec::new())
    }

    /// Initialization callbacks. Never run on substitutes.
    fn initialize(
        &self,
        instance: Instance,
        _descriptor: &ComponentDescriptor,
    ) -> Result<Instance, ContainerError> {
        Ok(instance)
    }

    /// Post-initialization hooks. Run on every instance, substituted or not.
    fn post_initialize(
        &self,
        instance: Instance,
        _descriptor: &ComponentDescriptor,
    ) -> Result<Instance, ContainerError> {
        Ok(instance)
    }
}

/// **CREATE COMPONENT**
///
/// **STEPS**:
/// 1. Run the pipeline (substitution, instantiation, veto, property interception)
/// 2. Apply properties unless skipped, suppressed or bypassed
/// 3. `initialize` (non-substituted only), then `post_initialize`
///
/// **GUARANTEE**: On error nothing is returned; no partially built instance escapes.
pub fn create_component<C>(
    container: &C,
    pipeline: &ConstructionPipeline,
    descriptor: &ComponentDescriptor,
    properties: PropertySet,
) -> Result<Instance, PipelineError>
where
    C: Container + ?Sized,
{
    let ConstructionOutcome {
        instance,
        substituted,
        population,
    } = pipeline.construct(container, descriptor, properties)?;

    if substituted {
        return Ok(container.post_initialize(instance, descriptor)?);
    }

    match &population {
        Population::Apply(properties) => container.apply_properties(&instance, properties)?,
        Population::Skipped | Population::Suppressed => {
            log::debug!("Property population for '{}': {:?}", descriptor.name(), population);
        }
        Population::Bypassed => {}
    }

    let instance = container.initialize(instance, descriptor)?;
    Ok(container.post_initialize(instance, descriptor)?)
}
