//! Error types for plinth-core.

use std::sync::Arc;

use thiserror::Error;

use crate::execute::{LifecycleStage, LifecycleState};

/// Result type for plinth-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by bound callables and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in plinth-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Arguments could not be resolved for an invocation.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// An invocation failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A lifecycle transition failed.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed extension model document.
    #[error("invalid model document: {0}")]
    ModelDocument(#[from] serde_json::Error),
}

impl Error {
    /// Render the error together with a recovery hint, if one applies.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Configuration(ConfigurationError::MissingParameter { .. }) => {
                Some("supply the parameter in the execution context or declare a default value")
            }
            Self::Lifecycle(LifecycleError::IllegalTransition { .. }) => {
                Some("lifecycle stages run in order: initialise, start, stop, dispose")
            }
            Self::ModelDocument(_) => {
                Some("model documents are JSON objects with at least a \"name\" field")
            }
            Self::Execution(e) if e.is_fatal() => Some("fatal failures should not be retried"),
            _ => None,
        }
    }
}

/// Arguments for a component could not be resolved from the execution context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required parameter was absent and declares no default.
    #[error("required parameter '{parameter}' of component '{component}' was not provided")]
    MissingParameter { component: String, parameter: String },
}

/// Unrecoverable runtime conditions.
///
/// A bound callable signals one of these by returning it as its error; panics
/// raised by the callable are converted into [`FatalError::Panic`].
#[derive(Debug, Error)]
pub enum FatalError {
    /// The callable panicked.
    #[error("panicked: {0}")]
    Panic(String),

    /// A resource the callable depends on is exhausted.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The result was dropped before the invocation completed it.
    #[error("result abandoned before completion")]
    Abandoned,
}

/// Failure of a single invocation.
///
/// Cloning is cheap and keeps the underlying source shared, so every observer
/// of one failure sees the same source instance.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// Recoverable failure raised by the invoked callable itself.
    #[error("operation '{component}' failed: {source}")]
    Operation {
        component: String,
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Fatal condition, wrapped so hosts can skip retries.
    #[error("operation '{component}' hit a fatal condition: {source}")]
    Fatal {
        component: String,
        source: Arc<FatalError>,
    },
}

impl ExecutionError {
    pub(crate) fn operation(component: &str, source: BoxError) -> Self {
        Self::Operation {
            component: component.to_string(),
            source: Arc::from(source),
        }
    }

    pub(crate) fn fatal(component: &str, source: FatalError) -> Self {
        Self::Fatal {
            component: component.to_string(),
            source: Arc::new(source),
        }
    }

    /// Whether this failure is fatal and should not be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Name of the component whose invocation failed.
    pub fn component(&self) -> &str {
        match self {
            Self::Operation { component, .. } | Self::Fatal { component, .. } => component,
        }
    }

    /// The fatal condition, if this failure is fatal.
    pub fn fatal_cause(&self) -> Option<&FatalError> {
        match self {
            Self::Fatal { source, .. } => Some(&**source),
            Self::Operation { .. } => None,
        }
    }

    /// Downcast a recoverable failure's source to a concrete error type.
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Operation { source, .. } => source.downcast_ref::<E>(),
            Self::Fatal { .. } => None,
        }
    }

    /// Whether both failures carry the same source instance.
    pub fn shares_source_with(&self, other: &ExecutionError) -> bool {
        match (self, other) {
            (Self::Operation { source: a, .. }, Self::Operation { source: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            (Self::Fatal { source: a, .. }, Self::Fatal { source: b, .. }) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A lifecycle transition could not be applied.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The stage is not permitted from the current state.
    #[error("cannot {stage} a component that is {from}")]
    IllegalTransition {
        from: LifecycleState,
        stage: LifecycleStage,
    },

    /// The callable's own hook for the stage failed.
    #[error("{stage} of component '{component}' failed: {source}")]
    StageFailed {
        component: String,
        stage: LifecycleStage,
        source: BoxError,
    },
}
