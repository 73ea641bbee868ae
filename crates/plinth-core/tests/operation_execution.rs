//! Integration tests for operation execution.
//!
//! Covers the full path: argument resolution, invocation, failure
//! classification, completion delivery and lifecycle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use serde_json::{Value, json};

use plinth_core::{
    Arguments, BoxError, COMPLETION_CALLBACK_VARIABLE, CallableBinding, CompletionCallback,
    ComponentModel, ExecutionContext, ExecutionError, ExecutorConfig, FatalError, Invocable,
    LifecycleError, LifecycleState, OperationExecutor, ParameterModel,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// Callback that records every notification it receives.
#[derive(Default)]
struct RecordingCallback {
    successes: Mutex<Vec<Value>>,
    errors: Mutex<Vec<ExecutionError>>,
}

impl RecordingCallback {
    fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl CompletionCallback for RecordingCallback {
    fn success(&self, value: &Value) {
        self.successes.lock().unwrap().push(value.clone());
    }

    fn error(&self, error: &ExecutionError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

#[derive(Debug, thiserror::Error)]
#[error("account {0} is frozen")]
struct AccountFrozen(String);

/// A transfer operation with a required account and an optional amount.
fn transfer_model() -> Arc<ComponentModel> {
    Arc::new(
        ComponentModel::new("transfer")
            .with_parameter(ParameterModel::required("account"))
            .with_parameter(ParameterModel::optional("amount").with_default(100)),
    )
}

/// Callable that rejects frozen accounts, runs out of resources on the
/// "exhausted" account and panics on the "corrupt" account.
struct Ledger;

impl Invocable for Ledger {
    fn invoke(&self, args: &Arguments, _ctx: &ExecutionContext) -> Result<Value, BoxError> {
        let account: String = args.get_as("account")?;
        let amount: i64 = args.get_as("amount")?;
        match account.as_str() {
            "frozen" => Err(AccountFrozen(account).into()),
            "exhausted" => Err(FatalError::ResourceExhausted("ledger connections".into()).into()),
            "corrupt" => panic!("ledger index corrupted"),
            _ => Ok(json!({ "account": account, "amount": amount })),
        }
    }
}

fn ledger_executor() -> OperationExecutor {
    let mut executor = OperationExecutor::new(transfer_model(), CallableBinding::new(Ledger));
    executor.initialise().unwrap();
    executor.start().unwrap();
    executor
}

fn context_for(account: &str, callback: &Arc<RecordingCallback>) -> ExecutionContext {
    ExecutionContext::new()
        .with_parameter("account", account)
        .with_completion_callback(callback.clone())
}

// =============================================================================
// Completion
// =============================================================================

#[tokio::test]
async fn test_success_delivers_return_value() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());

    let value = executor
        .execute(&context_for("alice", &callback))
        .unwrap()
        .await
        .unwrap();

    assert_eq!(value, json!({ "account": "alice", "amount": 100 }));
    assert_eq!(callback.error_count(), 0);
}

#[tokio::test]
async fn test_recoverable_failure_notifies_callback_once() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());

    let err = executor
        .execute(&context_for("frozen", &callback))
        .unwrap()
        .await
        .unwrap_err();

    assert!(!err.is_fatal());
    assert_eq!(
        err.downcast_source::<AccountFrozen>().map(|e| e.0.as_str()),
        Some("frozen")
    );

    let seen = callback.errors.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].shares_source_with(&err));
}

#[tokio::test]
async fn test_fatal_failure_is_wrapped_on_both_channels() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());

    let err = executor
        .execute(&context_for("exhausted", &callback))
        .unwrap()
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    let seen = callback.errors.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_fatal());
    assert!(seen[0].shares_source_with(&err));
}

#[tokio::test]
async fn test_panic_is_delivered_as_fatal() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());

    let err = executor
        .execute(&context_for("corrupt", &callback))
        .unwrap()
        .await
        .unwrap_err();

    match err.fatal_cause() {
        Some(FatalError::Panic(message)) => assert!(message.contains("corrupted")),
        other => panic!("expected a panic cause, got {:?}", other),
    }
    assert_eq!(callback.error_count(), 1);
}

#[test]
fn test_failure_without_callback() {
    let executor = ledger_executor();
    let ctx = ExecutionContext::new().with_parameter("account", "frozen");

    let outcome = executor.execute(&ctx).unwrap().into_outcome().unwrap();
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_callback_variable_write_does_not_drop_callback() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());
    let stray = Arc::new(RecordingCallback::default());
    let ctx =
        context_for("frozen", &callback).with_variable(COMPLETION_CALLBACK_VARIABLE, stray.clone());

    let err = executor.execute(&ctx).unwrap().await.unwrap_err();

    assert!(!err.is_fatal());
    assert_eq!(callback.error_count(), 1);
    assert_eq!(stray.error_count(), 0);
}

#[tokio::test]
async fn test_callback_registered_through_variable() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());
    let registered: Arc<dyn CompletionCallback> = callback.clone();
    let ctx = ExecutionContext::new()
        .with_parameter("account", "frozen")
        .with_variable(COMPLETION_CALLBACK_VARIABLE, registered);

    executor.execute(&ctx).unwrap().await.unwrap_err();
    assert_eq!(callback.error_count(), 1);
}

#[test]
fn test_missing_argument_fails_before_invocation() {
    let executor = ledger_executor();
    let callback = Arc::new(RecordingCallback::default());
    let ctx = ExecutionContext::new().with_completion_callback(callback.clone());

    let err = executor.execute(&ctx).unwrap_err();
    assert_eq!(
        err.to_string(),
        "required parameter 'account' of component 'transfer' was not provided"
    );
    assert_eq!(callback.error_count(), 0);
}

#[test]
fn test_callable_may_signal_success_itself() {
    let executor = OperationExecutor::new(
        Arc::new(ComponentModel::new("notify")),
        CallableBinding::from_fn(|_, ctx| {
            if let Some(callback) = ctx.completion_callback() {
                callback.success(&json!("sent"));
            }
            Ok(Value::Null)
        }),
    );
    let callback = Arc::new(RecordingCallback::default());
    let ctx = ExecutionContext::new().with_completion_callback(callback.clone());

    executor.execute(&ctx).unwrap();
    assert_eq!(*callback.successes.lock().unwrap(), vec![json!("sent")]);
    assert_eq!(callback.error_count(), 0);
}

#[test]
#[should_panic(expected = "ledger index corrupted")]
fn test_propagate_panics_config() {
    let executor = OperationExecutor::with_config(
        transfer_model(),
        CallableBinding::new(Ledger),
        ExecutorConfig::propagate_panics(),
    );
    let ctx = ExecutionContext::new().with_parameter("account", "corrupt");
    let _ = executor.execute(&ctx);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_invocations_share_binding() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let executor = OperationExecutor::new(
        Arc::new(ComponentModel::new("square").with_parameter(ParameterModel::required("n"))),
        CallableBinding::from_fn(move |args, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            let n: i64 = args.get_as("n")?;
            Ok(json!(n * n))
        }),
    );

    let results: Vec<Value> = (0..64i64)
        .into_par_iter()
        .map(|n| {
            let ctx = ExecutionContext::new().with_parameter("n", n);
            executor
                .execute(&ctx)
                .unwrap()
                .into_outcome()
                .unwrap()
                .unwrap()
        })
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 64);
    for (n, value) in results.iter().enumerate() {
        assert_eq!(value, &json!((n * n) as i64));
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_restart_sequence_with_declared_stages() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (on_init, on_start, on_stop, on_dispose) =
        (log.clone(), log.clone(), log.clone(), log.clone());

    let binding = CallableBinding::new(Ledger)
        .on_initialise(move || {
            on_init.lock().unwrap().push("initialise");
            Ok(())
        })
        .on_start(move || {
            on_start.lock().unwrap().push("start");
            Ok(())
        })
        .on_stop(move || {
            on_stop.lock().unwrap().push("stop");
            Ok(())
        })
        .on_dispose(move || {
            on_dispose.lock().unwrap().push("dispose");
            Ok(())
        });

    let mut executor = OperationExecutor::new(transfer_model(), binding);
    executor.initialise().unwrap();
    executor.start().unwrap();
    executor.stop().unwrap();
    executor.start().unwrap();
    executor.stop().unwrap();
    executor.dispose().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["initialise", "start", "stop", "start", "stop", "dispose"]
    );
    assert_eq!(executor.state(), LifecycleState::Disposed);

    for result in [
        executor.initialise(),
        executor.start(),
        executor.stop(),
        executor.dispose(),
    ] {
        assert!(matches!(
            result,
            Err(LifecycleError::IllegalTransition {
                from: LifecycleState::Disposed,
                ..
            })
        ));
    }
}

#[test]
fn test_undeclared_stages_are_noops() {
    let mut executor = OperationExecutor::new(transfer_model(), CallableBinding::new(Ledger));

    executor.initialise().unwrap();
    assert_eq!(executor.state(), LifecycleState::Initialised);
    executor.start().unwrap();
    assert_eq!(executor.state(), LifecycleState::Started);
    executor.stop().unwrap();
    assert_eq!(executor.state(), LifecycleState::Stopped);
    executor.dispose().unwrap();
    assert_eq!(executor.state(), LifecycleState::Disposed);
}

#[test]
fn test_failed_initialise_can_be_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let binding = CallableBinding::new(Ledger).on_initialise(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err("credentials not yet available".into())
        } else {
            Ok(())
        }
    });

    let mut executor = OperationExecutor::new(transfer_model(), binding);
    let err = executor.initialise().unwrap_err();
    assert!(err.to_string().contains("credentials not yet available"));
    assert_eq!(executor.state(), LifecycleState::Created);

    executor.initialise().unwrap();
    assert_eq!(executor.state(), LifecycleState::Initialised);
}

#[test]
fn test_start_twice_is_rejected() {
    let mut executor = ledger_executor();
    assert!(matches!(
        executor.start(),
        Err(LifecycleError::IllegalTransition {
            from: LifecycleState::Started,
            ..
        })
    ));
}
