//! Node type definitions for the source tree.

use crate::model::graph::{PinDefinition, PinDirection, PropertyValue, SourceNode};

/// Type ids of the built-in node types.
pub mod type_ids {
    pub const ITERATION: &str = "input.iteration";
    pub const MATH: &str = "math.math";
    pub const VECTOR_MATH: &str = "math.vector_math";
    pub const SEPARATE_VECTOR: &str = "vector.separate";
    pub const COMBINE_VECTOR: &str = "vector.combine";
    pub const TRANSLATION_TRANSFORM: &str = "transform.translation";
    pub const GET_TRANSLATION: &str = "transform.get_translation";
    pub const EULER_TRANSFORM: &str = "transform.euler";
    pub const GET_EULER: &str = "transform.get_euler";
    pub const AXIS_ANGLE_TRANSFORM: &str = "transform.axis_angle";
    pub const GET_AXIS_ANGLE: &str = "transform.get_axis_angle";
    pub const SCALE_TRANSFORM: &str = "transform.scale";
    pub const GET_SCALE: &str = "transform.get_scale";
    pub const FRAME: &str = "layout.frame";
    pub const REROUTE: &str = "layout.reroute";
}

/// Category of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// External graph inputs (iteration counter)
    Input,
    /// Scalar and vector arithmetic
    Math,
    /// Vector component split/combine
    Vector,
    /// Transform construction and decomposition
    Transform,
    /// Organizational nodes that compile to nothing
    Layout,
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeCategory::Input => "Input",
            NodeCategory::Math => "Math",
            NodeCategory::Vector => "Vector",
            NodeCategory::Transform => "Transform",
            NodeCategory::Layout => "Layout",
        };
        write!(f, "{}", s)
    }
}

/// Definition of a node type, registered in the `NodeTypeRegistry`.
///
/// Describes the sockets and default parameters of the type. Concrete nodes
/// are `SourceNode`s whose `type_id` references a definition.
#[derive(Debug, Clone)]
pub struct NodeTypeDefinition {
    pub type_id: String,
    pub display_name: String,
    pub category: NodeCategory,
    pub description: String,
    pub inputs: Vec<PinDefinition>,
    pub outputs: Vec<PinDefinition>,
    pub default_properties: Vec<(String, PropertyValue)>,
}

impl NodeTypeDefinition {
    pub fn new(type_id: &str, display_name: &str, category: NodeCategory) -> Self {
        Self {
            type_id: type_id.to_string(),
            display_name: display_name.to_string(),
            category,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            default_properties: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<PinDefinition>) -> Self {
        debug_assert!(inputs.iter().all(|p| p.direction == PinDirection::Input));
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PinDefinition>) -> Self {
        debug_assert!(outputs.iter().all(|p| p.direction == PinDirection::Output));
        self.outputs = outputs;
        self
    }

    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.default_properties.push((name.to_string(), value.into()));
        self
    }

    /// Create a node of this type with fresh sockets and default parameters.
    pub fn instantiate(&self, name: &str) -> SourceNode {
        let mut node = SourceNode::new(name, &self.type_id)
            .with_inputs(self.inputs.iter().map(PinDefinition::instantiate).collect())
            .with_outputs(self.outputs.iter().map(PinDefinition::instantiate).collect());
        for (key, value) in &self.default_properties {
            node.properties.set(key.clone(), value.clone());
        }
        node
    }
}
