pub use crate::config::{LateRegistrationPolicy, PipelineConfig};
pub use crate::container::{create_component, ComponentFactory, Container, FactoryContainer};
pub use crate::errors::{ConstructionError, ContainerError, PipelineError};
pub use crate::interceptor::{
    Interceptor, InterceptorError, InterceptorResult, Phase, PhaseResult, PropertyOutcome,
};
pub use crate::pipeline::{ConstructionOutcome, ConstructionPipeline, ConstructionState, Population};
pub use crate::registry::{InterceptorChain, InterceptorRegistry, Registration};
pub use crate::types::{
    instance, ComponentDescriptor, Instance, InstantiationKind, PropertyDescriptor, PropertySet,
    PropertyValue, TypeDescriptor,
};
