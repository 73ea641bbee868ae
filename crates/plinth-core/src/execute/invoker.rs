//! Bound callables and the synchronous component executor.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::config::ExecutorConfig;
use crate::error::{BoxError, ConfigurationError, ExecutionError, FatalError};
use crate::model::ComponentModel;

use super::context::ExecutionContext;
use super::lifecycle::LifecycleStage;
use super::resolver::{ArgumentResolver, Arguments};

/// Code bound to a component.
///
/// Implementations are shared across concurrent invocations and must not keep
/// per-invocation state. Returning a [`FatalError`] marks the failure as fatal;
/// any other error is recoverable.
pub trait Invocable: Send + Sync {
    fn invoke(&self, args: &Arguments, ctx: &ExecutionContext) -> Result<Value, BoxError>;
}

impl<F> Invocable for F
where
    F: Fn(&Arguments, &ExecutionContext) -> Result<Value, BoxError> + Send + Sync,
{
    fn invoke(&self, args: &Arguments, ctx: &ExecutionContext) -> Result<Value, BoxError> {
        self(args, ctx)
    }
}

type StageHook = Box<dyn FnMut() -> Result<(), BoxError> + Send + Sync>;

/// A callable plus the lifecycle stages it declared at registration.
///
/// A stage without a hook is not supported by the callable; the lifecycle
/// manager treats it as a no-op.
pub struct CallableBinding {
    target: Arc<dyn Invocable>,
    initialise: Option<StageHook>,
    start: Option<StageHook>,
    stop: Option<StageHook>,
    dispose: Option<StageHook>,
}

impl CallableBinding {
    pub fn new(target: impl Invocable + 'static) -> Self {
        Self::shared(Arc::new(target))
    }

    /// Bind a target that is also referenced elsewhere, e.g. by its hooks.
    pub fn shared(target: Arc<dyn Invocable>) -> Self {
        Self {
            target,
            initialise: None,
            start: None,
            stop: None,
            dispose: None,
        }
    }

    /// Bind a closure. Prefer this over [`new`](Self::new) for closures so
    /// their argument lifetimes are inferred correctly.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Arguments, &ExecutionContext) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    pub fn on_initialise(
        mut self,
        hook: impl FnMut() -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.initialise = Some(Box::new(hook));
        self
    }

    pub fn on_start(
        mut self,
        hook: impl FnMut() -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.start = Some(Box::new(hook));
        self
    }

    pub fn on_stop(
        mut self,
        hook: impl FnMut() -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.stop = Some(Box::new(hook));
        self
    }

    pub fn on_dispose(
        mut self,
        hook: impl FnMut() -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.dispose = Some(Box::new(hook));
        self
    }

    /// Whether the callable declared `stage`.
    pub fn supports(&self, stage: LifecycleStage) -> bool {
        self.hook(stage).is_some()
    }

    fn hook(&self, stage: LifecycleStage) -> Option<&StageHook> {
        match stage {
            LifecycleStage::Initialise => self.initialise.as_ref(),
            LifecycleStage::Start => self.start.as_ref(),
            LifecycleStage::Stop => self.stop.as_ref(),
            LifecycleStage::Dispose => self.dispose.as_ref(),
        }
    }

    /// Run the hook for `stage`. `None` when the stage was not declared.
    pub(crate) fn run_stage(&mut self, stage: LifecycleStage) -> Option<Result<(), BoxError>> {
        let hook = match stage {
            LifecycleStage::Initialise => self.initialise.as_mut(),
            LifecycleStage::Start => self.start.as_mut(),
            LifecycleStage::Stop => self.stop.as_mut(),
            LifecycleStage::Dispose => self.dispose.as_mut(),
        };
        hook.map(|h| h())
    }
}

impl fmt::Debug for CallableBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<_> = LifecycleStage::ALL
            .into_iter()
            .filter(|s| self.supports(*s))
            .collect();
        f.debug_struct("CallableBinding")
            .field("stages", &stages)
            .finish_non_exhaustive()
    }
}

/// Resolves arguments and calls the bound callable on the calling thread.
///
/// Failures are classified but never recovered: callable errors become
/// [`ExecutionError::Operation`], panics and [`FatalError`]s become
/// [`ExecutionError::Fatal`].
#[derive(Debug)]
pub struct ComponentExecutor {
    resolver: ArgumentResolver,
    binding: CallableBinding,
    config: ExecutorConfig,
}

impl ComponentExecutor {
    pub fn new(model: &ComponentModel, binding: CallableBinding, config: ExecutorConfig) -> Self {
        Self {
            resolver: ArgumentResolver::for_model(model),
            binding,
            config,
        }
    }

    pub fn component(&self) -> &str {
        self.resolver.component()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn binding(&self) -> &CallableBinding {
        &self.binding
    }

    pub(crate) fn binding_mut(&mut self) -> &mut CallableBinding {
        &mut self.binding
    }

    pub fn resolve(&self, ctx: &ExecutionContext) -> Result<Arguments, ConfigurationError> {
        self.resolver.resolve(ctx)
    }

    /// Resolve arguments and invoke.
    ///
    /// The outer `Result` carries configuration errors, the inner one the
    /// invocation outcome.
    pub fn execute(
        &self,
        ctx: &ExecutionContext,
    ) -> Result<Result<Value, ExecutionError>, ConfigurationError> {
        let args = self.resolve(ctx)?;
        Ok(self.invoke(&args, ctx))
    }

    /// Invoke the callable with already resolved arguments.
    pub fn invoke(&self, args: &Arguments, ctx: &ExecutionContext) -> Result<Value, ExecutionError> {
        let target = &self.binding.target;

        // The panic hook still runs before the unwind is caught.
        let outcome = if self.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| target.invoke(args, ctx))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    tracing::debug!("component {} panicked: {}", self.component(), message);
                    return Err(ExecutionError::fatal(
                        self.component(),
                        FatalError::Panic(message),
                    ));
                }
            }
        } else {
            target.invoke(args, ctx)
        };

        outcome.map_err(|e| self.classify(e))
    }

    fn classify(&self, error: BoxError) -> ExecutionError {
        match error.downcast::<FatalError>() {
            Ok(fatal) => ExecutionError::fatal(self.component(), *fatal),
            Err(error) => ExecutionError::operation(self.component(), error),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
