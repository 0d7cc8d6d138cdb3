//! Node of the source tree.

use serde::{Deserialize, Serialize};

use super::connection::Socket;
use super::property::{PropertyMap, PropertyValue};

/// A node as authored in the host editor.
///
/// `type_id` references a `NodeTypeDefinition` in the node type registry;
/// nodes whose type is not registered are skipped by the compiler.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SourceNode {
    /// Unique within its tree.
    pub name: String,
    pub type_id: String,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
}

impl SourceNode {
    pub fn new(name: &str, type_id: &str) -> Self {
        Self {
            name: name.to_string(),
            type_id: type_id.to_string(),
            properties: PropertyMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<Socket>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<Socket>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn input(&self, index: usize) -> Option<&Socket> {
        self.inputs.get(index)
    }

    pub fn input_mut(&mut self, index: usize) -> Option<&mut Socket> {
        self.inputs.get_mut(index)
    }

    pub fn output(&self, index: usize) -> Option<&Socket> {
        self.outputs.get(index)
    }
}
