use crate::container::Container;
use crate::errors::{error_codes, ContainerError};
use crate::types::{ComponentDescriptor, Instance, PropertyDescriptor, PropertySet};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type InstanceFactory = Box<dyn Fn() -> Result<Instance, ContainerError> + Send + Sync>;
type PropertyApplier = Box<dyn Fn(&Instance, &PropertySet) -> Result<(), ContainerError> + Send + Sync>;

pub struct ComponentFactory {
    pub key: String,
    pub factory: InstanceFactory,
    pub descriptors: Vec<PropertyDescriptor>,
}

impl ComponentFactory {
    pub fn new<T, F>(key: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            factory: Box::new(move || Ok(Arc::new(factory()) as Instance)),
            descriptors: Vec::new(),
        }
    }

    pub fn with_descriptors(mut self, descriptors: Vec<PropertyDescriptor>) -> Self {
        self.descriptors = descriptors;
        self
    }
}

/// Minimal [`Container`] backed by per-name factories and per-type property appliers.
///
/// Used by the test-suite and benchmarks, and as a reference for real container
/// integrations.
#[derive(Default)]
pub struct FactoryContainer {
    factories: HashMap<String, ComponentFactory>,
    appliers: HashMap<TypeId, PropertyApplier>,
}

impl FactoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: ComponentFactory) {
        self.factories.insert(factory.key.clone(), factory);
    }

    /// Install how properties are written onto instances of `T`.
    pub fn register_applier<T, F>(&mut self, apply: F)
    where
        T: Any + Send + Sync,
        F: Fn(&T, &PropertySet) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        let applier: PropertyApplier = Box::new(move |instance, properties| {
            let target = instance.downcast_ref::<T>().ok_or_else(|| {
                ContainerError::new(
                    error_codes::PROPERTY_APPLICATION_FAILED,
                    format!("Instance is not a {}", std::any::type_name::<T>()),
                )
            })?;
            apply(target, properties)
        });
        self.appliers.insert(TypeId::of::<T>(), applier);
    }
}

impl Container for FactoryContainer {
    fn default_instantiate(&self, descriptor: &ComponentDescriptor) -> Result<Instance, ContainerError> {
        let entry = self.factories.get(descriptor.name()).ok_or_else(|| {
            ContainerError::new(
                error_codes::INSTANTIATION_FAILED,
                format!("No factory registered for '{}'", descriptor.name()),
            )
        })?;
        (entry.factory)()
    }

    fn apply_properties(&self, instance: &Instance, properties: &PropertySet) -> Result<(), ContainerError> {
        if properties.is_empty() {
            return Ok(());
        }
        match self.appliers.get(&(**instance).type_id()) {
            Some(apply) => apply(instance, properties),
            None => Err(ContainerError::new(
                error_codes::PROPERTY_APPLICATION_FAILED,
                format!(
                    "No property applier for instance; cannot apply {} properties",
                    properties.len()
                ),
            )),
        }
    }

    fn property_descriptors(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Vec<PropertyDescriptor>, ContainerError> {
        self.factories
            .get(descriptor.name())
            .map(|entry| entry.descriptors.clone())
            .ok_or_else(|| {
                ContainerError::new(
                    error_codes::DESCRIPTOR_RESOLUTION_FAILED,
                    format!("No property descriptors for unknown component '{}'", descriptor.name()),
                )
            })
    }
}
