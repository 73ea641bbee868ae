//! Declarative extension model types.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Name of the parameter group used when a component declares none.
pub const DEFAULT_GROUP_NAME: &str = "General";

/// Kind of a declared component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Extension,
    Configuration,
    ConnectionProvider,
    Operation,
    Source,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extension => "extension",
            Self::Configuration => "configuration",
            Self::ConnectionProvider => "connection provider",
            Self::Operation => "operation",
            Self::Source => "source",
        };
        f.write_str(name)
    }
}

/// Reference to a component by kind and name, used in reports and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentRef {
    pub kind: ComponentKind,
    pub name: String,
}

impl ComponentRef {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// Structural shape of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    /// Strings, numbers, booleans, enums.
    Scalar,
    /// Lists, sets and maps.
    Collection,
    /// Records with named fields.
    Structured,
}

/// Whether a declared type can be instantiated directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeForm {
    #[default]
    Concrete,
    Interface,
    Abstract,
}

/// The declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub shape: TypeShape,
    #[serde(default)]
    pub form: TypeForm,
    /// The type defines value equality.
    #[serde(default)]
    pub implements_eq: bool,
    /// The type defines a hash consistent with its equality.
    #[serde(default)]
    pub implements_hash: bool,
}

impl TypeDescriptor {
    fn with_shape(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            form: TypeForm::Concrete,
            implements_eq: false,
            implements_hash: false,
        }
    }

    /// A scalar type. Scalars always have value semantics.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_shape(name, TypeShape::Scalar).with_value_semantics()
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Self::with_shape(name, TypeShape::Collection)
    }

    /// A concrete structured type without equality or hashing.
    pub fn structured(name: impl Into<String>) -> Self {
        Self::with_shape(name, TypeShape::Structured)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            form: TypeForm::Interface,
            ..Self::with_shape(name, TypeShape::Structured)
        }
    }

    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            form: TypeForm::Abstract,
            ..Self::with_shape(name, TypeShape::Structured)
        }
    }

    pub fn with_eq(mut self) -> Self {
        self.implements_eq = true;
        self
    }

    pub fn with_hash(mut self) -> Self {
        self.implements_hash = true;
        self
    }

    /// Declare both value equality and hashing.
    pub fn with_value_semantics(self) -> Self {
        self.with_eq().with_hash()
    }

    /// Concrete record types are compared by value when components are cached.
    pub fn is_concrete_structured(&self) -> bool {
        self.form == TypeForm::Concrete && self.shape == TypeShape::Structured
    }
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterModel {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<TypeDescriptor>,
}

impl ParameterModel {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            default_value: None,
            declared_type: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_type(mut self, declared_type: TypeDescriptor) -> Self {
        self.declared_type = Some(declared_type);
        self
    }
}

/// An ordered, named set of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroupModel {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterModel>,
}

impl ParameterGroupModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterModel) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Declarative description of an operation, source or connection provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub parameter_groups: Vec<ParameterGroupModel>,
}

impl ComponentModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameter_groups: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_group(mut self, group: ParameterGroupModel) -> Self {
        self.parameter_groups.push(group);
        self
    }

    /// Add a parameter to the default group, creating it if needed.
    pub fn with_parameter(mut self, parameter: ParameterModel) -> Self {
        match self
            .parameter_groups
            .iter_mut()
            .find(|g| g.name == DEFAULT_GROUP_NAME)
        {
            Some(group) => group.parameters.push(parameter),
            None => self
                .parameter_groups
                .push(ParameterGroupModel::new(DEFAULT_GROUP_NAME).with_parameter(parameter)),
        }
        self
    }

    /// All parameters in group order, then declaration order.
    pub fn all_parameters(&self) -> impl Iterator<Item = &ParameterModel> {
        self.parameter_groups.iter().flat_map(|g| g.parameters.iter())
    }
}

/// A configuration and the components scoped to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationModel {
    #[serde(flatten)]
    pub component: ComponentModel,
    #[serde(default)]
    pub connection_providers: Vec<ComponentModel>,
    #[serde(default)]
    pub operations: Vec<ComponentModel>,
    /// Message sources that emit into a flow instead of being invoked.
    #[serde(default)]
    pub sources: Vec<ComponentModel>,
}

impl ConfigurationModel {
    pub fn new(component: ComponentModel) -> Self {
        Self {
            component,
            connection_providers: Vec::new(),
            operations: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.component.name
    }

    pub fn with_connection_provider(mut self, provider: ComponentModel) -> Self {
        self.connection_providers.push(provider);
        self
    }

    pub fn with_operation(mut self, operation: ComponentModel) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_source(mut self, source: ComponentModel) -> Self {
        self.sources.push(source);
        self
    }
}

/// When an extension model was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// Built while packaging the extension; static checks apply.
    #[default]
    CompileTime,
    /// Rebuilt by a running host from already validated metadata.
    Runtime,
}

/// The root of a declared extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionModel {
    pub name: String,
    #[serde(default)]
    pub load_phase: LoadPhase,
    #[serde(default)]
    pub configurations: Vec<ConfigurationModel>,
    #[serde(default)]
    pub connection_providers: Vec<ComponentModel>,
    #[serde(default)]
    pub operations: Vec<ComponentModel>,
    #[serde(default)]
    pub sources: Vec<ComponentModel>,
}

impl ExtensionModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            load_phase: LoadPhase::CompileTime,
            configurations: Vec::new(),
            connection_providers: Vec::new(),
            operations: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_load_phase(mut self, phase: LoadPhase) -> Self {
        self.load_phase = phase;
        self
    }

    pub fn with_configuration(mut self, configuration: ConfigurationModel) -> Self {
        self.configurations.push(configuration);
        self
    }

    pub fn with_connection_provider(mut self, provider: ComponentModel) -> Self {
        self.connection_providers.push(provider);
        self
    }

    pub fn with_operation(mut self, operation: ComponentModel) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_source(mut self, source: ComponentModel) -> Self {
        self.sources.push(source);
        self
    }

    /// Parse a model document.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a model document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }
}
