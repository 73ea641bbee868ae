//! Parameter declaration checks.

use rustc_hash::FxHashSet;

use crate::model::{ComponentKind, ComponentModel, ComponentRef, ExtensionModel, ModelNode, nodes};

use super::{ExtensionModelValidator, Problem, ProblemsReporter};

/// Rejects components whose parameters cannot be resolved unambiguously:
/// two parameters with the same name on one component resolve from the same
/// context value, so the second is reported as an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterModelValidator;

impl ParameterModelValidator {
    fn check(kind: ComponentKind, model: &ComponentModel, reporter: &mut ProblemsReporter) {
        let mut seen = FxHashSet::default();
        for parameter in model.all_parameters() {
            if !seen.insert(parameter.name.as_str()) {
                reporter.add_error(Problem::new(
                    ComponentRef::new(kind, &model.name),
                    format!("Parameter '{}' is declared more than once", parameter.name),
                ));
            }
        }
    }
}

impl ExtensionModelValidator for ParameterModelValidator {
    fn validate(&self, model: &ExtensionModel, reporter: &mut ProblemsReporter) {
        for node in nodes(model) {
            match node {
                ModelNode::Configuration(config) => {
                    Self::check(ComponentKind::Configuration, &config.component, reporter)
                }
                ModelNode::ConnectionProvider { model, .. } => {
                    Self::check(ComponentKind::ConnectionProvider, model, reporter)
                }
                ModelNode::Operation { model, .. } => {
                    Self::check(ComponentKind::Operation, model, reporter)
                }
                ModelNode::Source { model, .. } => Self::check(ComponentKind::Source, model, reporter),
                ModelNode::Parameter { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::{ArgumentResolver, ExecutionContext};
    use crate::model::{ParameterGroupModel, ParameterModel};
    use serde_json::Value;

    #[test]
    fn test_duplicate_across_groups() {
        let model = ExtensionModel::new("http").with_operation(
            ComponentModel::new("request")
                .with_group(
                    ParameterGroupModel::new("Target")
                        .with_parameter(ParameterModel::required("path")),
                )
                .with_parameter(ParameterModel::optional("path")),
        );

        let mut reporter = ProblemsReporter::new();
        ParameterModelValidator.validate(&model, &mut reporter);

        assert_eq!(reporter.errors().len(), 1);
        assert_eq!(
            reporter.errors()[0].component,
            ComponentRef::new(ComponentKind::Operation, "request")
        );
    }

    #[test]
    fn test_required_with_default_is_accepted() {
        let model = ComponentModel::new("request")
            .with_parameter(ParameterModel::required("method").with_default("GET"));
        let resolver = ArgumentResolver::for_model(&model);

        let mut reporter = ProblemsReporter::new();
        ParameterModelValidator.validate(&ExtensionModel::new("http").with_operation(model), &mut reporter);
        assert!(reporter.is_empty());

        let args = resolver.resolve(&ExecutionContext::new()).unwrap();
        assert_eq!(args.get("method"), Some(&Value::from("GET")));
    }

    #[test]
    fn test_source_parameters_checked() {
        let model = ExtensionModel::new("jms").with_source(
            ComponentModel::new("listener")
                .with_parameter(ParameterModel::required("destination"))
                .with_parameter(ParameterModel::required("destination")),
        );

        let mut reporter = ProblemsReporter::new();
        ParameterModelValidator.validate(&model, &mut reporter);
        assert_eq!(
            reporter.errors()[0].component,
            ComponentRef::new(ComponentKind::Source, "listener")
        );
    }

    #[test]
    fn test_clean_model() {
        let model = ExtensionModel::new("http").with_operation(
            ComponentModel::new("request")
                .with_parameter(ParameterModel::required("path"))
                .with_parameter(ParameterModel::optional("method").with_default("GET")),
        );

        let mut reporter = ProblemsReporter::new();
        ParameterModelValidator.validate(&model, &mut reporter);
        assert!(reporter.is_empty());
    }
}
