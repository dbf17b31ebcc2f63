//! # CONSTRUCT CORE LIBRARY
//!
//! **CONSTRUCTION INTERCEPTOR PIPELINE FOR A DEPENDENCY-INJECTION CONTAINER**
//!
//! **ARCHITECTURE**: Trait-based interceptors, frozen ordered registry, per-construction
//! state machine
//! **GUARANTEE**: No partially constructed instance is ever handed back
//!
//! ## FLOW
//!
//! 1. **REGISTER** - `InterceptorRegistry::register` while the container is being configured
//! 2. **FREEZE** - `ConstructionPipeline::from_registry` snapshots the chain
//! 3. **CONSTRUCT** - `create_component` per instance, from any number of threads
//!
//! ```rust
//! use construct::api::*;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! struct Skip;
//! impl Interceptor for Skip {
//!     fn after_instantiation(&self, _instance: &Instance, _name: &str) -> InterceptorResult<bool> {
//!         Ok(false)
//!     }
//! }
//!
//! let registry = InterceptorRegistry::new();
//! registry.register(Arc::new(Skip)).unwrap();
//! let pipeline = ConstructionPipeline::from_registry(&registry);
//!
//! let mut container = FactoryContainer::new();
//! container.register(ComponentFactory::new("greeter", || Greeter));
//!
//! let descriptor = ComponentDescriptor::new::<Greeter>("greeter");
//! let greeter = create_component(&container, &pipeline, &descriptor, PropertySet::new()).unwrap();
//! assert!(greeter.downcast_ref::<Greeter>().is_some());
//! ```

pub mod api;
pub mod config;
pub mod container;
pub mod errors;
pub mod interceptor;
pub mod pipeline;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests {
    use crate::api::*;
    use crate::testing::{init_logging, CallLog, ScriptedInterceptor};
    use std::sync::Arc;
    use std::thread;

    struct Worker;

    // **CONCURRENT PASSES**
    #[test]
    fn test_concurrent_constructions_share_one_chain() {
        init_logging();
        let log = CallLog::default();
        let registry = InterceptorRegistry::new();
        registry
            .register(ScriptedInterceptor::new("observer", &log).into_arc())
            .unwrap();
        let pipeline = Arc::new(ConstructionPipeline::from_registry(&registry));

        let mut container = FactoryContainer::new();
        for i in 0..8 {
            container.register(ComponentFactory::new(format!("worker-{}", i), || Worker));
        }
        let container = Arc::new(container);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pipeline = Arc::clone(&pipeline);
                let container = Arc::clone(&container);
                thread::spawn(move || {
                    let descriptor = ComponentDescriptor::new::<Worker>(format!("worker-{}", i));
                    create_component(&*container, &pipeline, &descriptor, PropertySet::new())
                })
            })
            .collect();

        for handle in handles {
            let created = handle.join().unwrap().unwrap();
            assert!(created.downcast_ref::<Worker>().is_some());
        }
        assert_eq!(
            log.entries().iter().filter(|e| e.as_str() == "observer:before").count(),
            8
        );
    }

    #[test]
    fn test_registration_rejected_once_serving() {
        let registry = InterceptorRegistry::new();
        let _pipeline = ConstructionPipeline::from_registry(&registry);
        let log = CallLog::default();

        let result = registry.register(ScriptedInterceptor::new("late", &log).into_arc());
        assert!(matches!(result, Err(PipelineError::Registry { .. })));
    }
}
