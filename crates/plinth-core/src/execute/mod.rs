//! Execution engine for declared operations.
//!
//! # Architecture
//!
//! ```text
//! ComponentModel + CallableBinding
//!     │
//!     └── OperationExecutor
//!             │
//!             ├── ArgumentResolver   ExecutionContext → Arguments
//!             │
//!             ├── ComponentExecutor  Arguments → Value | ExecutionError
//!             │       └── catch_unwind, fatal/recoverable classification
//!             │
//!             ├── AsyncResult        completed once, callback notified on failure
//!             │
//!             └── LifecycleManager   initialise → start → stop → dispose
//! ```
//!
//! # Module Structure
//!
//! - `context` - Execution context and completion callbacks
//! - `resolver` - Argument resolution
//! - `invoker` - Bound callables and the synchronous executor
//! - `completion` - Single-assignment asynchronous result
//! - `lifecycle` - Lifecycle states and stage delegation
//! - `operation` - OperationExecutor entry point

mod completion;
mod context;
mod invoker;
mod lifecycle;
mod operation;
mod resolver;

pub use completion::{AsyncResult, CompletionSlot, Outcome};
pub use context::{COMPLETION_CALLBACK_VARIABLE, CompletionCallback, ExecutionContext};
pub use invoker::{CallableBinding, ComponentExecutor, Invocable};
pub use lifecycle::{LifecycleManager, LifecycleStage, LifecycleState};
pub use operation::OperationExecutor;
pub use resolver::{ArgumentResolver, Arguments};
