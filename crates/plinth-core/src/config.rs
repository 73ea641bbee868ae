//! Configuration for executors and validators.

/// Configuration for an operation executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Catch panics raised by the bound callable and deliver them as fatal
    /// failures. When disabled, a panic unwinds through `execute` and no
    /// result is delivered.
    ///
    /// Catching does not silence the process panic hook: the default hook
    /// still prints a "thread panicked" message to stderr for every caught
    /// panic. Hosts that report fatal failures themselves should install
    /// their own hook with [`std::panic::set_hook`].
    pub catch_panics: bool,

    /// Log a debug event when `execute` is called while the executor is not
    /// started. The call still proceeds.
    pub trace_unstarted_calls: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            trace_unstarted_calls: true,
        }
    }
}

impl ExecutorConfig {
    /// Config for hosts that run with `panic = "abort"` or want panics to
    /// reach their own handler.
    pub fn propagate_panics() -> Self {
        Self {
            catch_panics: false,
            ..Default::default()
        }
    }
}

/// Configuration for model validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Only run compile-time checks on models loaded at compile time.
    pub enforce_load_phase: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_load_phase: true,
        }
    }
}

impl ValidationConfig {
    /// Run every check regardless of the model's load phase.
    pub fn all_phases() -> Self {
        Self {
            enforce_load_phase: false,
        }
    }
}
