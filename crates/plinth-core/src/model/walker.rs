//! Depth-first traversal of an extension model.
//!
//! The tree is flattened into [`ModelNode`]s in declaration order and each
//! node is dispatched to the matching [`ModelVisitor`] handler:
//!
//! ```text
//! ExtensionModel
//!     ├── ConfigurationModel          on_configuration
//!     │       ├── parameters          on_parameter
//!     │       ├── connection provider on_connection_provider (+ parameters)
//!     │       ├── operation           on_operation (+ parameters)
//!     │       └── source              on_source (+ parameters)
//!     ├── connection provider         on_connection_provider (+ parameters)
//!     ├── operation                   on_operation (+ parameters)
//!     └── source                      on_source (+ parameters)
//! ```

use std::fmt;

use super::types::{
    ComponentKind, ComponentModel, ComponentRef, ConfigurationModel, ExtensionModel,
    ParameterGroupModel, ParameterModel,
};

/// The extension or configuration that scopes a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner<'a> {
    /// [`ComponentKind::Extension`] or [`ComponentKind::Configuration`].
    pub kind: ComponentKind,
    pub name: &'a str,
}

impl Owner<'_> {
    pub fn is_extension(&self) -> bool {
        self.kind == ComponentKind::Extension
    }
}

impl fmt::Display for Owner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One reachable element of an extension model.
#[derive(Debug, Clone, Copy)]
pub enum ModelNode<'a> {
    Configuration(&'a ConfigurationModel),
    ConnectionProvider {
        owner: Owner<'a>,
        model: &'a ComponentModel,
    },
    Operation {
        owner: Owner<'a>,
        model: &'a ComponentModel,
    },
    Source {
        owner: Owner<'a>,
        model: &'a ComponentModel,
    },
    Parameter {
        /// Kind and name of the component declaring the parameter.
        owner: ComponentKind,
        owner_name: &'a str,
        group: &'a ParameterGroupModel,
        parameter: &'a ParameterModel,
    },
}

impl ModelNode<'_> {
    /// Reference to the component this node is, or belongs to.
    pub fn component_ref(&self) -> ComponentRef {
        match self {
            Self::Configuration(model) => ComponentRef::new(ComponentKind::Configuration, model.name()),
            Self::ConnectionProvider { model, .. } => {
                ComponentRef::new(ComponentKind::ConnectionProvider, &model.name)
            }
            Self::Operation { model, .. } => ComponentRef::new(ComponentKind::Operation, &model.name),
            Self::Source { model, .. } => ComponentRef::new(ComponentKind::Source, &model.name),
            Self::Parameter {
                owner, owner_name, ..
            } => ComponentRef::new(*owner, *owner_name),
        }
    }
}

/// Per-kind handlers invoked by [`walk`]. Every handler defaults to a no-op.
pub trait ModelVisitor {
    fn on_configuration(&mut self, _model: &ConfigurationModel) {}

    /// `owner` is the enclosing configuration or the extension itself.
    fn on_connection_provider(&mut self, _owner: Owner<'_>, _model: &ComponentModel) {}

    fn on_operation(&mut self, _owner: Owner<'_>, _model: &ComponentModel) {}

    fn on_source(&mut self, _owner: Owner<'_>, _model: &ComponentModel) {}

    fn on_parameter(
        &mut self,
        _owner: &ComponentRef,
        _group: &ParameterGroupModel,
        _parameter: &ParameterModel,
    ) {
    }
}

/// Flatten the model into its reachable nodes in traversal order.
pub fn nodes(model: &ExtensionModel) -> Vec<ModelNode<'_>> {
    let mut out = Vec::new();

    for config in &model.configurations {
        let owner = Owner {
            kind: ComponentKind::Configuration,
            name: config.name(),
        };
        out.push(ModelNode::Configuration(config));
        push_parameters(&mut out, ComponentKind::Configuration, &config.component);

        for provider in &config.connection_providers {
            push_component(&mut out, ComponentKind::ConnectionProvider, owner, provider);
        }
        for operation in &config.operations {
            push_component(&mut out, ComponentKind::Operation, owner, operation);
        }
        for source in &config.sources {
            push_component(&mut out, ComponentKind::Source, owner, source);
        }
    }

    let owner = Owner {
        kind: ComponentKind::Extension,
        name: &model.name,
    };
    for provider in &model.connection_providers {
        push_component(&mut out, ComponentKind::ConnectionProvider, owner, provider);
    }
    for operation in &model.operations {
        push_component(&mut out, ComponentKind::Operation, owner, operation);
    }
    for source in &model.sources {
        push_component(&mut out, ComponentKind::Source, owner, source);
    }

    out
}

/// Push a scoped component followed by its parameters.
fn push_component<'a>(
    out: &mut Vec<ModelNode<'a>>,
    kind: ComponentKind,
    owner: Owner<'a>,
    model: &'a ComponentModel,
) {
    out.push(match kind {
        ComponentKind::ConnectionProvider => ModelNode::ConnectionProvider { owner, model },
        ComponentKind::Source => ModelNode::Source { owner, model },
        _ => ModelNode::Operation { owner, model },
    });
    push_parameters(out, kind, model);
}

fn push_parameters<'a>(
    out: &mut Vec<ModelNode<'a>>,
    owner: ComponentKind,
    model: &'a ComponentModel,
) {
    for group in &model.parameter_groups {
        for parameter in &group.parameters {
            out.push(ModelNode::Parameter {
                owner,
                owner_name: &model.name,
                group,
                parameter,
            });
        }
    }
}

/// Walk the model, dispatching every reachable node to `visitor` exactly once.
pub fn walk(model: &ExtensionModel, visitor: &mut impl ModelVisitor) {
    for node in nodes(model) {
        match node {
            ModelNode::Configuration(config) => visitor.on_configuration(config),
            ModelNode::ConnectionProvider { owner, model } => {
                visitor.on_connection_provider(owner, model)
            }
            ModelNode::Operation { owner, model } => visitor.on_operation(owner, model),
            ModelNode::Source { owner, model } => visitor.on_source(owner, model),
            ModelNode::Parameter {
                group, parameter, ..
            } => visitor.on_parameter(&node.component_ref(), group, parameter),
        }
    }
}
