//! Operation executor: the asynchronous entry point for invoking a component.
//!
//! `execute` runs the bound callable synchronously and returns an
//! [`AsyncResult`] that is already completed. A failure is delivered once to
//! the optional completion callback and then to the result, both observing
//! the same [`ExecutionError`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::ExecutorConfig;
use crate::error::{ConfigurationError, ExecutionError, LifecycleError};
use crate::model::ComponentModel;

use super::completion::{AsyncResult, CompletionSlot};
use super::context::ExecutionContext;
use super::invoker::{CallableBinding, ComponentExecutor};
use super::lifecycle::{LifecycleManager, LifecycleStage, LifecycleState};
use super::resolver::ArgumentResolver;

/// Executes one declared operation against its bound callable.
///
/// `execute` takes `&self` and may be called concurrently from several
/// threads. Lifecycle stages take `&mut self`.
#[derive(Debug)]
pub struct OperationExecutor {
    model: Arc<ComponentModel>,
    executor: ComponentExecutor,
    lifecycle: LifecycleManager,
}

impl OperationExecutor {
    pub fn new(model: Arc<ComponentModel>, binding: CallableBinding) -> Self {
        Self::with_config(model, binding, ExecutorConfig::default())
    }

    pub fn with_config(
        model: Arc<ComponentModel>,
        binding: CallableBinding,
        config: ExecutorConfig,
    ) -> Self {
        let executor = ComponentExecutor::new(&model, binding, config);
        Self {
            model,
            executor,
            lifecycle: LifecycleManager::new(),
        }
    }

    pub fn model(&self) -> &ComponentModel {
        &self.model
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Invoke the operation.
    ///
    /// Missing required arguments are returned immediately as a
    /// [`ConfigurationError`]; the callable and the completion callback are
    /// not touched. Otherwise the returned result is already completed.
    pub fn execute(&self, ctx: &ExecutionContext) -> Result<AsyncResult, ConfigurationError> {
        let component = self.executor.component();

        if self.executor.config().trace_unstarted_calls && self.state() != LifecycleState::Started {
            tracing::debug!(
                "executing {} while {} (invocation {})",
                component,
                self.state(),
                ctx.id()
            );
        }

        let args = self.executor.resolve(ctx)?;
        let (slot, result) = AsyncResult::pending(component);

        match self.executor.invoke(&args, ctx) {
            Ok(value) => {
                tracing::debug!("{} completed (invocation {})", component, ctx.id());
                slot.succeed(value);
            }
            Err(error) => deliver_failure(ctx, error, slot),
        }

        Ok(result)
    }

    /// Argument resolver for `model`, for hosts that resolve arguments ahead
    /// of invocation.
    pub fn create_argument_resolver(&self, model: &ComponentModel) -> ArgumentResolver {
        if model.parameter_groups.is_empty() {
            ArgumentResolver::empty(&model.name)
        } else {
            ArgumentResolver::for_model(model)
        }
    }

    pub fn initialise(&mut self) -> Result<(), LifecycleError> {
        self.apply(LifecycleStage::Initialise)
    }

    pub fn start(&mut self) -> Result<(), LifecycleError> {
        self.apply(LifecycleStage::Start)
    }

    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        self.apply(LifecycleStage::Stop)
    }

    /// Dispose the executor. Only an illegal transition is reported; a failing
    /// dispose hook is logged.
    pub fn dispose(&mut self) -> Result<(), LifecycleError> {
        self.apply(LifecycleStage::Dispose)
    }

    fn apply(&mut self, stage: LifecycleStage) -> Result<(), LifecycleError> {
        self.lifecycle
            .apply(&self.model.name, stage, self.executor.binding_mut())
    }
}

/// Fan one failure out to the completion callback, if registered, then to
/// the result. A panicking callback is logged and does not stop completion.
fn deliver_failure(ctx: &ExecutionContext, error: ExecutionError, slot: CompletionSlot) {
    tracing::debug!(
        "{} failed (invocation {}, fatal: {}): {}",
        error.component(),
        ctx.id(),
        error.is_fatal(),
        error
    );

    if let Some(callback) = ctx.completion_callback() {
        let notified = panic::catch_unwind(AssertUnwindSafe(|| callback.error(&error)));
        if notified.is_err() {
            tracing::error!(
                "completion callback of {} panicked while handling: {}",
                error.component(),
                error
            );
        }
    }

    slot.fail(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::CompletionCallback;
    use crate::model::ParameterModel;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        errors: Mutex<Vec<ExecutionError>>,
        panic_on_error: bool,
    }

    impl CompletionCallback for Recording {
        fn success(&self, _value: &Value) {}

        fn error(&self, error: &ExecutionError) {
            self.errors.lock().unwrap().push(error.clone());
            if self.panic_on_error {
                panic!("callback exploded");
            }
        }
    }

    fn echo_model() -> Arc<ComponentModel> {
        Arc::new(ComponentModel::new("echo").with_parameter(ParameterModel::required("message")))
    }

    fn echo() -> OperationExecutor {
        OperationExecutor::new(
            echo_model(),
            CallableBinding::from_fn(|args, _| Ok(args.get("message").cloned().unwrap_or_default())),
        )
    }

    fn failing() -> OperationExecutor {
        OperationExecutor::new(
            echo_model(),
            CallableBinding::from_fn(|_, _| Err("mailbox full".into())),
        )
    }

    #[test]
    fn test_success_completes_result() {
        let callback = Arc::new(Recording::default());
        let ctx = ExecutionContext::new()
            .with_parameter("message", "hi")
            .with_completion_callback(callback.clone());

        let result = echo().execute(&ctx).unwrap();
        assert_eq!(result.into_outcome().unwrap().unwrap(), json!("hi"));
        assert!(callback.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failure_reaches_both_channels() {
        let callback = Arc::new(Recording::default());
        let ctx = ExecutionContext::new()
            .with_parameter("message", "hi")
            .with_completion_callback(callback.clone());

        let result = failing().execute(&ctx).unwrap();
        let err = result.into_outcome().unwrap().unwrap_err();

        let seen = callback.errors.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].shares_source_with(&err));
    }

    #[test]
    fn test_panicking_callback_does_not_block_completion() {
        let callback = Arc::new(Recording {
            panic_on_error: true,
            ..Default::default()
        });
        let ctx = ExecutionContext::new()
            .with_parameter("message", "hi")
            .with_completion_callback(callback.clone());

        let result = failing().execute(&ctx).unwrap();
        assert!(result.into_outcome().unwrap().is_err());
        assert_eq!(callback.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_configuration_error_is_synchronous() {
        let callback = Arc::new(Recording::default());
        let ctx = ExecutionContext::new().with_completion_callback(callback.clone());

        let err = failing().execute(&ctx).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingParameter { .. }));
        assert!(callback.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_lifecycle_delegation() {
        let mut executor = echo();
        assert_eq!(executor.state(), LifecycleState::Created);

        executor.initialise().unwrap();
        executor.start().unwrap();
        assert_eq!(executor.state(), LifecycleState::Started);
        executor.stop().unwrap();
        executor.dispose().unwrap();
        assert!(executor.start().is_err());
    }

    #[test]
    fn test_create_argument_resolver() {
        let executor = echo();
        let resolver = executor.create_argument_resolver(executor.model());
        assert_eq!(resolver.parameter_names(), ["message"]);

        let resolver = executor.create_argument_resolver(&ComponentModel::new("ping"));
        assert!(resolver.parameter_names().is_empty());
    }
}
