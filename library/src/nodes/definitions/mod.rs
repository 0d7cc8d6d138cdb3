//! Hardcoded node type definitions for object node trees.

mod input;
mod layout;
mod math;
mod transform;
mod vector;

use crate::model::graph::{PinDefinition, SocketType};
use crate::nodes::node_types::{NodeCategory, NodeTypeDefinition};

// ---------------------------------------------------------------------------
// Pin helpers
// ---------------------------------------------------------------------------

fn inp(name: &str, dt: SocketType) -> PinDefinition {
    PinDefinition::input(name, dt)
}

fn out(name: &str, dt: SocketType) -> PinDefinition {
    PinDefinition::output(name, dt)
}

fn node(type_id: &str, name: &str, cat: NodeCategory) -> NodeTypeDefinition {
    NodeTypeDefinition::new(type_id, name, cat)
}

fn float_in(name: &str) -> PinDefinition {
    inp(name, SocketType::Float).with_default(0.0)
}

fn vector_in(name: &str, x: f64, y: f64, z: f64) -> PinDefinition {
    inp(name, SocketType::Vector).with_default(crate::model::graph::Vec3::new(x, y, z))
}

/// Unnamed transform socket; carries no default, the IR falls back to identity.
fn transform_in() -> PinDefinition {
    inp("", SocketType::Transform)
}

fn transform_out() -> PinDefinition {
    out("", SocketType::Transform)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub(crate) fn all_node_definitions() -> Vec<NodeTypeDefinition> {
    [
        input::input_nodes(),
        math::math_nodes(),
        vector::vector_nodes(),
        transform::transform_nodes(),
        layout::layout_nodes(),
    ]
    .concat()
}
