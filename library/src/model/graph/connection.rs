//! Sockets and links of the source node tree.

use serde::{Deserialize, Serialize};

use super::property::PropertyValue;

/// Semantic type of a socket.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    Float,
    Int,
    Vector,
    Transform,
}

/// Direction of a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Definition of a socket on a node type; instantiated into a `Socket` per node.
#[derive(Clone, Debug)]
pub struct PinDefinition {
    pub name: String,
    pub direction: PinDirection,
    pub data_type: SocketType,
    /// Default value when no link is present (for input pins)
    pub default_value: Option<PropertyValue>,
}

impl PinDefinition {
    pub fn input(name: &str, data_type: SocketType) -> Self {
        Self {
            name: name.to_string(),
            direction: PinDirection::Input,
            data_type,
            default_value: None,
        }
    }

    pub fn output(name: &str, data_type: SocketType) -> Self {
        Self {
            name: name.to_string(),
            direction: PinDirection::Output,
            data_type,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn instantiate(&self) -> Socket {
        Socket {
            name: self.name.clone(),
            data_type: self.data_type,
            is_linked: false,
            hide: false,
            default_value: self.default_value.clone(),
        }
    }
}

/// A socket on a concrete node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Socket {
    pub name: String,
    pub data_type: SocketType,
    #[serde(default)]
    pub is_linked: bool,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub default_value: Option<PropertyValue>,
}

impl Socket {
    pub fn new(name: &str, data_type: SocketType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            is_linked: false,
            hide: false,
            default_value: None,
        }
    }

    /// Linked and shown in the editor.
    pub fn is_connected(&self) -> bool {
        !self.hide && self.is_linked
    }
}

/// Identifies a socket by node name and socket index.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketRef {
    pub node: String,
    pub socket: usize,
}

impl SocketRef {
    pub fn new(node: &str, socket: usize) -> Self {
        Self {
            node: node.to_string(),
            socket,
        }
    }
}

fn valid_by_default() -> bool {
    true
}

/// A directed edge from an output socket to an input socket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Link {
    pub from: SocketRef,
    pub to: SocketRef,
    /// Cleared by the host for links it considers broken; such links are skipped.
    #[serde(default = "valid_by_default")]
    pub is_valid: bool,
}

impl Link {
    pub fn new(from: SocketRef, to: SocketRef) -> Self {
        Self {
            from,
            to,
            is_valid: true,
        }
    }
}
