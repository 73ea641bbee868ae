//! Single-assignment asynchronous result of one invocation.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{ExecutionError, FatalError};

/// Outcome of one invocation.
pub type Outcome = Result<Value, ExecutionError>;

/// The completing half of an [`AsyncResult`].
///
/// Completion consumes the slot, so an outcome can be delivered at most once.
#[derive(Debug)]
pub struct CompletionSlot {
    component: String,
    tx: oneshot::Sender<Outcome>,
}

impl CompletionSlot {
    pub fn complete(self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!(
                "result of component {} dropped before completion",
                self.component
            );
        }
    }

    pub fn succeed(self, value: Value) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: ExecutionError) {
        self.complete(Err(error));
    }
}

/// Eventual outcome of one invocation.
///
/// Await it from async code, or take it directly with
/// [`into_outcome`](Self::into_outcome) when it is known to be complete.
#[derive(Debug)]
pub struct AsyncResult {
    component: String,
    rx: oneshot::Receiver<Outcome>,
}

impl AsyncResult {
    /// Create an uncompleted result and the slot that completes it.
    pub fn pending(component: &str) -> (CompletionSlot, AsyncResult) {
        let (tx, rx) = oneshot::channel();
        (
            CompletionSlot {
                component: component.to_string(),
                tx,
            },
            AsyncResult {
                component: component.to_string(),
                rx,
            },
        )
    }

    /// An already completed result.
    pub fn completed(component: &str, outcome: Outcome) -> Self {
        let (slot, result) = Self::pending(component);
        slot.complete(outcome);
        result
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Take the outcome without waiting. `None` if not yet completed.
    pub fn into_outcome(mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(self.abandoned())),
        }
    }

    fn abandoned(&self) -> ExecutionError {
        ExecutionError::fatal(&self.component, FatalError::Abandoned)
    }
}

impl Future for AsyncResult {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(this.abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}
