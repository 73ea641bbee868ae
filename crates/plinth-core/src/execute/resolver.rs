//! Argument resolution from an execution context.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::model::ComponentModel;

use super::context::ExecutionContext;

#[derive(Debug)]
struct ParameterSlot {
    name: String,
    required: bool,
    default_value: Option<Value>,
}

/// Maps an execution context onto a component's declared parameters.
///
/// The argument shape is derived once per component and shared by every
/// invocation; cloning is cheap.
#[derive(Debug, Clone)]
pub struct ArgumentResolver {
    component: Arc<str>,
    slots: Arc<[ParameterSlot]>,
    names: Arc<[String]>,
}

impl ArgumentResolver {
    /// Derive the argument shape of `model`: group order, then declaration order.
    pub fn for_model(model: &ComponentModel) -> Self {
        let slots: Vec<ParameterSlot> = model
            .all_parameters()
            .map(|p| ParameterSlot {
                name: p.name.clone(),
                required: p.required,
                default_value: p.default_value.clone(),
            })
            .collect();
        let names: Vec<String> = slots.iter().map(|s| s.name.clone()).collect();

        Self {
            component: Arc::from(model.name.as_str()),
            slots: slots.into(),
            names: names.into(),
        }
    }

    /// A resolver for components without parameters.
    pub fn empty(component: &str) -> Self {
        Self {
            component: Arc::from(component),
            slots: Arc::from(Vec::new()),
            names: Arc::from(Vec::new()),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Parameter names in positional order.
    pub fn parameter_names(&self) -> &[String] {
        &self.names
    }

    /// Resolve one invocation's arguments.
    ///
    /// Absent parameters fall back to their default, then to `null` when
    /// optional. An absent required parameter without default is a
    /// configuration error.
    pub fn resolve(&self, ctx: &ExecutionContext) -> Result<Arguments, ConfigurationError> {
        let mut values = Vec::with_capacity(self.slots.len());
        for slot in self.slots.iter() {
            let value = match (ctx.parameter(&slot.name), &slot.default_value) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.clone(),
                (None, None) if slot.required => {
                    return Err(ConfigurationError::MissingParameter {
                        component: self.component.to_string(),
                        parameter: slot.name.clone(),
                    });
                }
                (None, None) => Value::Null,
            };
            values.push(value);
        }

        Ok(Arguments {
            names: Arc::clone(&self.names),
            values,
        })
    }
}

/// Resolved arguments of one invocation, addressable by position or name.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Arguments {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Deserialize a named argument. An unknown name deserializes from `null`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, serde_json::Error> {
        match self.get(name) {
            Some(value) => T::deserialize(value),
            None => T::deserialize(&Value::Null),
        }
    }

    /// Keyword view of the arguments.
    pub fn into_map(self) -> Map<String, Value> {
        self.names.iter().cloned().zip(self.values).collect()
    }
}
