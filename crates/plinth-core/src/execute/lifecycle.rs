//! Lifecycle states and transitions for bound callables.
//!
//! ```text
//! Created ──initialise──► Initialised ──start──► Started ──stop──► Stopped ──dispose──► Disposed
//!    │                        │                     ▲                 │
//!    └──────dispose───────────┴──────► Disposed     └──────start──────┘
//! ```
//!
//! Transitions are serialized by the host: every stage takes `&mut self`, so
//! no invocation or other transition can run concurrently.

use std::fmt;

use crate::error::LifecycleError;

use super::invoker::CallableBinding;

/// Lifecycle state of an executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    #[default]
    Created,
    Initialised,
    Started,
    Stopped,
    Disposed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Initialised => "initialised",
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// A lifecycle stage a callable may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    Initialise,
    Start,
    Stop,
    Dispose,
}

impl LifecycleStage {
    pub const ALL: [LifecycleStage; 4] = [Self::Initialise, Self::Start, Self::Stop, Self::Dispose];
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialise => "initialise",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Dispose => "dispose",
        };
        f.write_str(name)
    }
}

impl LifecycleState {
    /// State reached by applying `stage`, if the transition is legal.
    pub fn next(self, stage: LifecycleStage) -> Option<LifecycleState> {
        use LifecycleStage as S;
        use LifecycleState::*;

        match (self, stage) {
            (Created, S::Initialise) => Some(Initialised),
            (Initialised | Stopped, S::Start) => Some(Started),
            (Started, S::Stop) => Some(Stopped),
            (Created | Initialised | Stopped, S::Dispose) => Some(Disposed),
            _ => None,
        }
    }
}

/// Tracks the lifecycle state and delegates each stage to the binding when
/// the binding declared it.
#[derive(Debug, Default)]
pub struct LifecycleManager {
    state: LifecycleState,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Apply `stage` to `binding`.
    ///
    /// A failing initialise, start or stop hook leaves the state unchanged. A
    /// failing dispose hook is logged and the component is disposed anyway.
    pub fn apply(
        &mut self,
        component: &str,
        stage: LifecycleStage,
        binding: &mut CallableBinding,
    ) -> Result<(), LifecycleError> {
        let next = self
            .state
            .next(stage)
            .ok_or(LifecycleError::IllegalTransition {
                from: self.state,
                stage,
            })?;

        match binding.run_stage(stage) {
            None => {
                tracing::debug!("{} does not declare {}, skipping", component, stage);
            }
            Some(Ok(())) => {}
            Some(Err(source)) if stage == LifecycleStage::Dispose => {
                tracing::warn!("failed to dispose {}: {}", component, source);
            }
            Some(Err(source)) => {
                return Err(LifecycleError::StageFailed {
                    component: component.to_string(),
                    stage,
                    source,
                });
            }
        }

        tracing::debug!("{}: {} -> {}", component, self.state, next);
        self.state = next;
        Ok(())
    }
}
