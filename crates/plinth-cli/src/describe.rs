//! Describe command implementation for Plinth CLI.

use plinth_core::{
    ComponentModel, ComponentRef, ConfigurationModel, ExtensionModel, ModelVisitor,
    Owner, ParameterGroupModel, ParameterModel, walk,
};

use crate::colors;

/// Print the component tree of a model document.
pub fn execute(model_path: &str) -> anyhow::Result<()> {
    let model = ExtensionModel::load(model_path)?;

    println!(
        "{}{}{} {}({:?}){}",
        colors::BOLD,
        model.name,
        colors::RESET,
        colors::DIM,
        model.load_phase,
        colors::RESET
    );

    let mut printer = TreePrinter { depth: 0 };
    walk(&model, &mut printer);
    Ok(())
}

/// Prints each component indented under its owner, parameters one level
/// below the component that declares them.
struct TreePrinter {
    depth: usize,
}

impl TreePrinter {
    fn line(&self, depth: usize, text: &str) {
        println!("{}{}", "  ".repeat(depth), text);
    }

    fn component(&mut self, owner: Owner<'_>, label: &str, model: &ComponentModel) {
        self.depth = if owner.is_extension() { 1 } else { 2 };
        self.line(
            self.depth,
            &format!("{}{}{} {}", colors::CYAN, label, colors::RESET, model.name),
        );
    }
}

impl ModelVisitor for TreePrinter {
    fn on_configuration(&mut self, model: &ConfigurationModel) {
        self.depth = 1;
        self.line(
            self.depth,
            &format!("{}configuration{} {}", colors::CYAN, colors::RESET, model.name()),
        );
    }

    fn on_connection_provider(&mut self, owner: Owner<'_>, model: &ComponentModel) {
        self.component(owner, "connection provider", model);
    }

    fn on_operation(&mut self, owner: Owner<'_>, model: &ComponentModel) {
        self.component(owner, "operation", model);
    }

    fn on_source(&mut self, owner: Owner<'_>, model: &ComponentModel) {
        self.component(owner, "source", model);
    }

    fn on_parameter(
        &mut self,
        _owner: &ComponentRef,
        group: &ParameterGroupModel,
        parameter: &ParameterModel,
    ) {
        let mut text = format!("{}.{}", group.name, parameter.name);
        if let Some(declared) = &parameter.declared_type {
            text.push_str(&format!(": {}", declared.name));
        }
        if parameter.required {
            text.push_str(" (required)");
        }
        if let Some(default) = &parameter.default_value {
            text.push_str(&format!(" = {}", default));
        }
        self.line(self.depth + 1, &text);
    }
}
