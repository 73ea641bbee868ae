//! Extension model: declared components, their parameters, and traversal.

mod types;
mod walker;

pub use types::{
    ComponentKind, ComponentModel, ComponentRef, ConfigurationModel, DEFAULT_GROUP_NAME,
    ExtensionModel, LoadPhase, ParameterGroupModel, ParameterModel, TypeDescriptor, TypeForm,
    TypeShape,
};
pub use walker::{ModelNode, ModelVisitor, Owner, nodes, walk};
