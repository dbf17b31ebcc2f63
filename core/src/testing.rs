//! Test doubles shared by the unit tests.

use crate::container::Container;
use crate::errors::{error_codes, ContainerError};
use crate::interceptor::{Interceptor, InterceptorResult, Phase, PropertyOutcome};
use crate::types::{
    instance, ComponentDescriptor, Instance, PropertyDescriptor, PropertySet, TypeDescriptor,
};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Ordered record of every callback, shared between interceptors and the container.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Scripted reaction of one interceptor callback.
#[derive(Clone, Debug)]
pub enum Script {
    /// Behave like the trait default.
    Default,
    Substitute(&'static str),
    Insert(&'static str, JsonValue),
    Suppress,
}

#[derive(Default)]
struct Received {
    properties: Option<PropertySet>,
    descriptors: Option<Vec<PropertyDescriptor>>,
}

#[derive(Clone)]
pub struct ScriptedInterceptor {
    name: &'static str,
    log: CallLog,
    before: Script,
    after: bool,
    properties: Script,
    legacy: Script,
    fail: Option<Phase>,
    received: Arc<Mutex<Received>>,
}

impl ScriptedInterceptor {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            before: Script::Default,
            after: true,
            properties: Script::Default,
            legacy: Script::Default,
            fail: None,
            received: Arc::new(Mutex::new(Received::default())),
        }
    }

    pub fn before(mut self, script: Script) -> Self {
        self.before = script;
        self
    }

    pub fn after(mut self, proceed: bool) -> Self {
        self.after = proceed;
        self
    }

    pub fn properties(mut self, script: Script) -> Self {
        self.properties = script;
        self
    }

    pub fn legacy(mut self, script: Script) -> Self {
        self.legacy = script;
        self
    }

    pub fn fail_in(mut self, phase: Phase) -> Self {
        self.fail = Some(phase);
        self
    }

    pub fn into_arc(self) -> Arc<dyn Interceptor> {
        Arc::new(self)
    }

    /// Property set handed to the most recent properties callback.
    pub fn last_properties(&self) -> Option<PropertySet> {
        self.received.lock().properties.clone()
    }

    /// Descriptors handed to the most recent legacy callback.
    pub fn last_descriptors(&self) -> Option<Vec<PropertyDescriptor>> {
        self.received.lock().descriptors.clone()
    }

    fn enter(&self, phase: Phase, tag: &str) -> InterceptorResult<()> {
        self.log.push(format!("{}:{}", self.name, tag));
        if self.fail == Some(phase) {
            return Err(format!("{} failed in {}", self.name, phase).into());
        }
        Ok(())
    }
}

fn inserted(properties: &PropertySet, name: &str, value: &JsonValue) -> PropertySet {
    let mut rewritten = properties.clone();
    rewritten.insert(name, value.clone());
    rewritten
}

impl Interceptor for ScriptedInterceptor {
    fn name(&self) -> &str {
        self.name
    }

    fn before_instantiation(&self, _target: &TypeDescriptor, _name: &str) -> InterceptorResult<Option<Instance>> {
        self.enter(Phase::BeforeInstantiation, "before")?;
        Ok(match &self.before {
            Script::Substitute(value) => Some(instance(*value)),
            _ => None,
        })
    }

    fn after_instantiation(&self, _instance: &Instance, _name: &str) -> InterceptorResult<bool> {
        self.enter(Phase::AfterInstantiation, "after")?;
        Ok(self.after)
    }

    fn intercept_properties(
        &self,
        properties: &PropertySet,
        _instance: &Instance,
        _name: &str,
    ) -> InterceptorResult<PropertyOutcome> {
        self.enter(Phase::Properties, "properties")?;
        self.received.lock().properties = Some(properties.clone());
        Ok(match &self.properties {
            Script::Insert(name, value) => PropertyOutcome::Handled(inserted(properties, name, value)),
            _ => PropertyOutcome::NotHandled,
        })
    }

    fn intercept_property_values(
        &self,
        properties: &PropertySet,
        descriptors: &[PropertyDescriptor],
        _instance: &Instance,
        _name: &str,
    ) -> InterceptorResult<Option<PropertySet>> {
        self.enter(Phase::LegacyProperties, "legacy")?;
        self.received.lock().descriptors = Some(descriptors.to_vec());
        Ok(match &self.legacy {
            Script::Insert(name, value) => Some(inserted(properties, name, value)),
            Script::Suppress => None,
            _ => Some(properties.clone()),
        })
    }
}

/// Container double that logs every call and records applied property sets.
pub struct RecordingContainer {
    log: CallLog,
    descriptors: Vec<PropertyDescriptor>,
    fail_instantiation: bool,
    fail_application: bool,
    fail_descriptors: bool,
    fail_initialization: bool,
    fail_post_initialization: bool,
    instantiations: Mutex<usize>,
    descriptor_requests: Mutex<usize>,
    applied: Mutex<Vec<PropertySet>>,
}

impl RecordingContainer {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            descriptors: Vec::new(),
            fail_instantiation: false,
            fail_application: false,
            fail_descriptors: false,
            fail_initialization: false,
            fail_post_initialization: false,
            instantiations: Mutex::new(0),
            descriptor_requests: Mutex::new(0),
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn with_descriptors(mut self, descriptors: Vec<PropertyDescriptor>) -> Self {
        self.descriptors = descriptors;
        self
    }

    pub fn failing_instantiation(mut self) -> Self {
        self.fail_instantiation = true;
        self
    }

    pub fn failing_application(mut self) -> Self {
        self.fail_application = true;
        self
    }

    pub fn failing_descriptors(mut self) -> Self {
        self.fail_descriptors = true;
        self
    }

    pub fn failing_initialization(mut self) -> Self {
        self.fail_initialization = true;
        self
    }

    pub fn failing_post_initialization(mut self) -> Self {
        self.fail_post_initialization = true;
        self
    }

    pub fn instantiations(&self) -> usize {
        *self.instantiations.lock()
    }

    pub fn descriptor_requests(&self) -> usize {
        *self.descriptor_requests.lock()
    }

    pub fn applied(&self) -> Vec<PropertySet> {
        self.applied.lock().clone()
    }
}

#[allow(dead_code)]
struct Built(String);

impl Container for RecordingContainer {
    fn default_instantiate(&self, descriptor: &ComponentDescriptor) -> Result<Instance, ContainerError> {
        self.log.push("container:instantiate");
        if self.fail_instantiation {
            return Err(ContainerError::new(
                error_codes::INSTANTIATION_FAILED,
                format!("cannot build '{}'", descriptor.name()),
            ));
        }
        *self.instantiations.lock() += 1;
        Ok(instance(Built(descriptor.name().to_string())))
    }

    fn apply_properties(&self, _instance: &Instance, properties: &PropertySet) -> Result<(), ContainerError> {
        self.log.push("container:apply");
        if self.fail_application {
            return Err(ContainerError::new(
                error_codes::PROPERTY_APPLICATION_FAILED,
                "read-only property",
            ));
        }
        self.applied.lock().push(properties.clone());
        Ok(())
    }

    fn property_descriptors(
        &self,
        _descriptor: &ComponentDescriptor,
    ) -> Result<Vec<PropertyDescriptor>, ContainerError> {
        self.log.push("container:descriptors");
        *self.descriptor_requests.lock() += 1;
        if self.fail_descriptors {
            return Err(ContainerError::new(
                error_codes::DESCRIPTOR_RESOLUTION_FAILED,
                "descriptors unavailable",
            ));
        }
        Ok(self.descriptors.clone())
    }

    fn initialize(&self, instance: Instance, _descriptor: &ComponentDescriptor) -> Result<Instance, ContainerError> {
        self.log.push("container:initialize");
        if self.fail_initialization {
            return Err(ContainerError::new(error_codes::INITIALIZATION_FAILED, "init hook failed"));
        }
        Ok(instance)
    }

    fn post_initialize(
        &self,
        instance: Instance,
        _descriptor: &ComponentDescriptor,
    ) -> Result<Instance, ContainerError> {
        self.log.push("container:post_initialize");
        if self.fail_post_initialization {
            return Err(ContainerError::new(
                error_codes::INITIALIZATION_FAILED,
                "post-initialization failed",
            ));
        }
        Ok(instance)
    }
}
