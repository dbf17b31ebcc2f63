//! # CONSTRUCTION TYPE DEFINITIONS
//!
//! **CRITICAL**: Data handed between the container and the interceptor pipeline
//! **MANDATE**: Descriptors are read-only to the pipeline; property sets and instances are
//! pass-local and never shared between concurrent constructions

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Type-erased handle to a constructed (or substituted) object.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wrap a value into an [`Instance`].
pub fn instance<T: Any + Send + Sync>(value: T) -> Instance {
    Arc::new(value)
}

/// **TARGET TYPE**
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How the container produces the default instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstantiationKind {
    /// The implementation type is known ahead of time.
    Concrete,
    /// The instance comes out of a factory method; its concrete type is only known afterwards.
    FactoryMethod { factory: String },
}

/// **COMPONENT DESCRIPTOR**
///
/// **PURPOSE**: Identifies the instance under construction
/// **GUARANTEE**: Immutable for the duration of one construction pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    name: String,
    target: TypeDescriptor,
    kind: InstantiationKind,
    synthetic: bool,
}

impl ComponentDescriptor {
    /// **CONSTRUCTOR** - Concrete, non-synthetic component of type `T`
    pub fn new<T: Any>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: TypeDescriptor::of::<T>(),
            kind: InstantiationKind::Concrete,
            synthetic: false,
        }
    }

    /// **FACTORY METHOD CONSTRUCTOR** - `T` is the declared return type of the factory
    pub fn from_factory<T: Any>(name: impl Into<String>, factory: impl Into<String>) -> Self {
        Self {
            kind: InstantiationKind::FactoryMethod {
                factory: factory.into(),
            },
            ..Self::new::<T>(name)
        }
    }

    /// **WITH SYNTHETIC FLAG** - Marks container-internal infrastructure
    pub fn synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TypeDescriptor {
        &self.target
    }

    pub fn kind(&self) -> &InstantiationKind {
        &self.kind
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Whether before-instantiation interception may apply at all.
    pub fn has_concrete_type(&self) -> bool {
        matches!(self.kind, InstantiationKind::Concrete)
    }
}

/// A single entry of a [`PropertySet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub name: String,
    pub value: JsonValue,
}

/// **PROPERTY SET**
///
/// **PURPOSE**: Ordered mapping from property name to the value the container will apply
/// **GUARANTEE**: Insertion order preserved; re-adding a name replaces its value in place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: Vec<PropertyValue>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// **BUILDER** - Add or replace a property
    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a value, returning the previous one for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|pv| pv.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.values.push(PropertyValue { name, value });
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<JsonValue> {
        let index = self.values.iter().position(|pv| pv.name == name)?;
        Some(self.values.remove(index).value)
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.iter().find(|pv| pv.name == name).map(|pv| &pv.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|pv| pv.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<N: Into<String>, V: Into<JsonValue>> FromIterator<(N, V)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl IntoIterator for PropertySet {
    type Item = PropertyValue;
    type IntoIter = std::vec::IntoIter<PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// **PROPERTY DESCRIPTOR** - Consumed only by the legacy property callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub type_name: String,
    pub writable: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            writable: true,
        }
    }
}
