//! # CONSTRUCTION INTERCEPTOR CONTRACT
//!
//! An [`Interceptor`] observes and may alter the construction of every component the
//! container builds. It has four phase callbacks, each with a no-op default, so an
//! implementation only overrides the phases it cares about:
//!
//! 1. **BEFORE INSTANTIATION** - may hand back a substitute object
//! 2. **AFTER INSTANTIATION** - may veto property population
//! 3. **PROPERTIES** - may rewrite the property set, or decline with [`PropertyOutcome::NotHandled`]
//! 4. **LEGACY PROPERTIES** - older form of (3), consulted only when (3) declines
//!
//! ## USAGE
//!
//! ```rust
//! use construct::interceptor::{Interceptor, InterceptorResult, PropertyOutcome};
//! use construct::types::{Instance, PropertySet};
//!
//! struct DefaultTimeout;
//!
//! impl Interceptor for DefaultTimeout {
//!     fn name(&self) -> &str {
//!         "default-timeout"
//!     }
//!
//!     fn intercept_properties(
//!         &self,
//!         properties: &PropertySet,
//!         _instance: &Instance,
//!         _name: &str,
//!     ) -> InterceptorResult<PropertyOutcome> {
//!         let mut rewritten = properties.clone();
//!         if !rewritten.contains("timeout") {
//!             rewritten.insert("timeout", 30);
//!         }
//!         Ok(PropertyOutcome::Handled(rewritten))
//!     }
//! }
//! ```

use crate::types::{Instance, PropertyDescriptor, PropertySet, TypeDescriptor};
use std::fmt;

/// Failure raised from inside an interceptor callback.
pub type InterceptorError = Box<dyn std::error::Error + Send + Sync>;

pub type InterceptorResult<T> = Result<T, InterceptorError>;

/// **CONSTRUCTION PHASE**
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeInstantiation,
    AfterInstantiation,
    Properties,
    LegacyProperties,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeforeInstantiation => "before-instantiation",
            Phase::AfterInstantiation => "after-instantiation",
            Phase::Properties => "properties",
            Phase::LegacyProperties => "legacy-properties",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return value of [`Interceptor::intercept_properties`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyOutcome {
    /// Use this set from now on.
    Handled(PropertySet),
    /// No opinion; the pipeline falls back to this interceptor's legacy callback.
    NotHandled,
}

/// **PHASE RESULT**
///
/// Tagged outcome of one interceptor step or one whole phase. Built and consumed within a
/// single construction pass.
#[derive(Clone)]
pub enum PhaseResult {
    /// Nothing decisive happened; carry on.
    Continue,
    /// Use this object instead of the default instance.
    Substitute(Instance),
    /// Do not populate properties.
    Suppress,
    /// Continue with this property set.
    Rewrite(PropertySet),
    /// The current-generation callback declined; the legacy callback decides.
    Defer,
}

impl fmt::Debug for PhaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseResult::Continue => f.write_str("Continue"),
            PhaseResult::Substitute(_) => f.write_str("Substitute(..)"),
            PhaseResult::Suppress => f.write_str("Suppress"),
            PhaseResult::Rewrite(set) => f.debug_tuple("Rewrite").field(set).finish(),
            PhaseResult::Defer => f.write_str("Defer"),
        }
    }
}

/// **CORE INTERCEPTOR TRAIT**
///
/// **MANDATE**: Implementations are shared by every construction for the lifetime of the
/// container, so they must be stateless or synchronize their own state.
/// **GUARANTEE**: Callbacks are invoked synchronously, in registration order.
pub trait Interceptor: Send + Sync {
    /// Identity used in diagnostics and error context.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called before the container instantiates `target`.
    ///
    /// Returning `Some` short-circuits the construction: default instantiation, property
    /// population and initialization are skipped, and the remaining interceptors are not
    /// asked. Only applied to components with a concrete implementation type.
    fn before_instantiation(
        &self,
        _target: &TypeDescriptor,
        _name: &str,
    ) -> InterceptorResult<Option<Instance>> {
        Ok(None)
    }

    /// Called on the bare instance before properties are populated.
    ///
    /// Returning `false` skips population for this instance and stops the remaining
    /// interceptors' after-instantiation callbacks.
    fn after_instantiation(&self, _instance: &Instance, _name: &str) -> InterceptorResult<bool> {
        Ok(true)
    }

    /// Post-process the property set before the container applies it.
    fn intercept_properties(
        &self,
        _properties: &PropertySet,
        _instance: &Instance,
        _name: &str,
    ) -> InterceptorResult<PropertyOutcome> {
        Ok(PropertyOutcome::NotHandled)
    }

    /// Legacy property callback with access to the target's property descriptors.
    ///
    /// Only invoked when [`Interceptor::intercept_properties`] returned
    /// [`PropertyOutcome::NotHandled`]. Returning `None` suppresses population.
    #[deprecated(note = "override `intercept_properties` instead")]
    fn intercept_property_values(
        &self,
        properties: &PropertySet,
        _descriptors: &[PropertyDescriptor],
        _instance: &Instance,
        _name: &str,
    ) -> InterceptorResult<Option<PropertySet>> {
        Ok(Some(properties.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::instance;

    struct Bare;
    impl Interceptor for Bare {}

    #[test]
    #[allow(deprecated)]
    fn test_defaults_are_no_ops() {
        let bare = Bare;
        let target = TypeDescriptor::of::<String>();
        let obj = instance(String::from("x"));
        let props = PropertySet::new().with("a", 1);

        assert!(bare.before_instantiation(&target, "x").unwrap().is_none());
        assert!(bare.after_instantiation(&obj, "x").unwrap());
        assert_eq!(
            bare.intercept_properties(&props, &obj, "x").unwrap(),
            PropertyOutcome::NotHandled
        );
        assert_eq!(
            bare.intercept_property_values(&props, &[], &obj, "x").unwrap(),
            Some(props)
        );
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert!(Bare.name().ends_with("Bare"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::BeforeInstantiation.to_string(), "before-instantiation");
        assert_eq!(Phase::LegacyProperties.to_string(), "legacy-properties");
    }
}
