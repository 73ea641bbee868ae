//! Core engine for Plinth extension operations.
//!
//! This crate provides:
//! - Extension model types (components, parameter groups, declared types)
//! - Argument resolution from an execution context
//! - Operation execution with an asynchronous completion result
//! - Lifecycle management for bound callables
//! - Model walking and static validation

pub mod config;
pub mod error;
pub mod execute;
pub mod model;
pub mod validate;

pub use config::{ExecutorConfig, ValidationConfig};
pub use error::{
    BoxError, ConfigurationError, Error, ExecutionError, FatalError, LifecycleError, Result,
};
pub use execute::{
    ArgumentResolver, Arguments, AsyncResult, COMPLETION_CALLBACK_VARIABLE, CallableBinding,
    CompletionCallback, CompletionSlot, ComponentExecutor, ExecutionContext, Invocable,
    LifecycleManager, LifecycleStage, LifecycleState, OperationExecutor,
};
pub use model::{
    ComponentKind, ComponentModel, ComponentRef, ConfigurationModel, ExtensionModel, LoadPhase,
    ModelNode, ModelVisitor, Owner, ParameterGroupModel, ParameterModel, TypeDescriptor, TypeForm,
    TypeShape, walk,
};
pub use validate::{
    EqualityContractValidator, ExtensionModelValidator, ParameterModelValidator, Problem,
    ProblemsReporter, default_validators, validate_all,
};
