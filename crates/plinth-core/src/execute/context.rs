//! Per-invocation execution context and completion callbacks.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ExecutionError;

/// Variable key under which a host registers its [`CompletionCallback`].
///
/// The key is reserved: only an `Arc<dyn CompletionCallback>` may be stored
/// under it. Use [`ExecutionContext::with_completion_callback`].
pub const COMPLETION_CALLBACK_VARIABLE: &str = "plinth.completion_callback";

/// Out-of-band sink for an invocation's outcome.
///
/// The executor calls [`error`](Self::error) when an invocation fails.
/// Callables that complete on their own schedule may call
/// [`success`](Self::success) themselves.
pub trait CompletionCallback: Send + Sync {
    fn success(&self, value: &Value);

    fn error(&self, error: &ExecutionError);
}

/// Resolved parameter values and host variables for one invocation.
///
/// Created per invocation and never shared between concurrent invocations.
pub struct ExecutionContext {
    id: Uuid,
    parameters: FxHashMap<String, Value>,
    variables: FxHashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            parameters: FxHashMap::default(),
            variables: FxHashMap::default(),
        }
    }

    /// Identifier of this invocation, used in log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn with_variable<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.set_variable(key, value);
        self
    }

    /// Store a host variable.
    ///
    /// Writes to [`COMPLETION_CALLBACK_VARIABLE`] are accepted only when
    /// `value` is an `Arc<dyn CompletionCallback>`; anything else is dropped
    /// with a warning and a previously registered callback is kept.
    pub fn set_variable<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if key == COMPLETION_CALLBACK_VARIABLE {
            match (&value as &dyn Any).downcast_ref::<Arc<dyn CompletionCallback>>() {
                Some(callback) => self.register_callback(callback.clone()),
                None => tracing::warn!(
                    "ignoring {} stored under {}; register callbacks with with_completion_callback",
                    std::any::type_name::<T>(),
                    COMPLETION_CALLBACK_VARIABLE
                ),
            }
            return;
        }
        self.variables.insert(key, Arc::new(value));
    }

    /// Typed lookup of a host variable. Returns `None` when the key is absent
    /// or holds a value of another type.
    pub fn variable<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.variables.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn remove_variable(&mut self, key: &str) -> bool {
        self.variables.remove(key).is_some()
    }

    pub fn with_completion_callback(mut self, callback: Arc<dyn CompletionCallback>) -> Self {
        self.register_callback(callback);
        self
    }

    fn register_callback(&mut self, callback: Arc<dyn CompletionCallback>) {
        self.variables
            .insert(COMPLETION_CALLBACK_VARIABLE.to_string(), Arc::new(callback));
    }

    /// The completion callback registered under [`COMPLETION_CALLBACK_VARIABLE`].
    pub fn completion_callback(&self) -> Option<&Arc<dyn CompletionCallback>> {
        self.variable::<Arc<dyn CompletionCallback>>(COMPLETION_CALLBACK_VARIABLE)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.variables.keys().collect();
        keys.sort();
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .field("variables", &keys)
            .finish()
    }
}
