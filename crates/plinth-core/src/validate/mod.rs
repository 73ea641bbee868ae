//! Static validation of extension models.
//!
//! Validators walk the model and record [`Problem`]s on a shared
//! [`ProblemsReporter`]. Nothing is thrown: every component is checked even
//! after problems were found on its siblings.

mod equality;
mod parameters;

use serde::Serialize;

use crate::config::ValidationConfig;
use crate::model::{ComponentRef, ExtensionModel};

pub use equality::EqualityContractValidator;
pub use parameters::ParameterModelValidator;

/// A convention violation found on a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Problem {
    pub component: ComponentRef,
    pub message: String,
}

impl Problem {
    pub fn new(component: ComponentRef, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.component, self.message)
    }
}

/// Accumulates problems found during validation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProblemsReporter {
    errors: Vec<Problem>,
    warnings: Vec<Problem>,
}

impl ProblemsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, problem: Problem) {
        tracing::debug!("validation error: {}", problem);
        self.errors.push(problem);
    }

    pub fn add_warning(&mut self, problem: Problem) {
        tracing::debug!("validation warning: {}", problem);
        self.warnings.push(problem);
    }

    pub fn errors(&self) -> &[Problem] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Problem] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// A static check over an extension model.
pub trait ExtensionModelValidator {
    fn validate(&self, model: &ExtensionModel, reporter: &mut ProblemsReporter);
}

/// The validators a host runs when an extension is packaged.
pub fn default_validators(config: &ValidationConfig) -> Vec<Box<dyn ExtensionModelValidator>> {
    vec![
        Box::new(ParameterModelValidator),
        Box::new(EqualityContractValidator::new(config.clone())),
    ]
}

/// Run `validators` over `model` with a fresh reporter.
pub fn validate_all(
    model: &ExtensionModel,
    validators: &[Box<dyn ExtensionModelValidator>],
) -> ProblemsReporter {
    let mut reporter = ProblemsReporter::new();
    for validator in validators {
        validator.validate(model, &mut reporter);
    }
    tracing::debug!(
        "validated extension '{}': {} errors, {} warnings",
        model.name,
        reporter.errors().len(),
        reporter.warnings().len()
    );
    reporter
}
