//! Checks that record-typed parameters declare value equality and hashing.
//!
//! Hosts cache configurations and connections keyed by their resolved
//! parameter values, so a concrete record type used as a parameter must
//! compare by value.

use crate::config::ValidationConfig;
use crate::model::{
    ComponentKind, ComponentModel, ComponentRef, ConfigurationModel, ExtensionModel, LoadPhase,
    ModelVisitor, Owner, walk,
};

use super::{ExtensionModelValidator, Problem, ProblemsReporter};

/// Warns about concrete structured parameter types lacking equality or hashing
/// on configurations and connection providers.
#[derive(Debug, Clone, Default)]
pub struct EqualityContractValidator {
    config: ValidationConfig,
}

impl EqualityContractValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }
}

impl ExtensionModelValidator for EqualityContractValidator {
    fn validate(&self, model: &ExtensionModel, reporter: &mut ProblemsReporter) {
        if self.config.enforce_load_phase && model.load_phase != LoadPhase::CompileTime {
            tracing::debug!(
                "skipping equality contract check for runtime model '{}'",
                model.name
            );
            return;
        }

        walk(model, &mut EqualityVisitor { reporter });
    }
}

struct EqualityVisitor<'r> {
    reporter: &'r mut ProblemsReporter,
}

impl EqualityVisitor<'_> {
    fn check(&mut self, kind: ComponentKind, model: &ComponentModel) {
        for parameter in model.all_parameters() {
            let Some(declared) = &parameter.declared_type else {
                continue;
            };
            if !declared.is_concrete_structured() {
                continue;
            }
            if !declared.implements_eq || !declared.implements_hash {
                self.reporter.add_warning(Problem::new(
                    ComponentRef::new(kind, &model.name),
                    format!(
                        "Type '{}' must implement value equality and hashing",
                        declared.name
                    ),
                ));
            }
        }
    }
}

impl ModelVisitor for EqualityVisitor<'_> {
    fn on_configuration(&mut self, model: &ConfigurationModel) {
        self.check(ComponentKind::Configuration, &model.component);
    }

    fn on_connection_provider(&mut self, _owner: Owner<'_>, model: &ComponentModel) {
        self.check(ComponentKind::ConnectionProvider, model);
    }
}
