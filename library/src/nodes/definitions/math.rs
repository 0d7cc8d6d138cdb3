use super::{float_in, node, out, vector_in};
use crate::model::graph::SocketType;
use crate::nodes::node_types::{NodeCategory, NodeTypeDefinition, type_ids};

pub(super) fn math_nodes() -> Vec<NodeTypeDefinition> {
    use SocketType::*;
    let nc = NodeCategory::Math;
    vec![
        node(type_ids::MATH, "Math", nc)
            .with_inputs(vec![float_in("Value"), float_in("Value")])
            .with_outputs(vec![out("Value", Float)])
            .with_property("mode", "ADD_FLOAT"),
        node(type_ids::VECTOR_MATH, "Vector Math", nc)
            .with_inputs(vec![
                vector_in("Vector", 0.0, 0.0, 0.0),
                vector_in("Vector", 0.0, 0.0, 0.0),
            ])
            .with_outputs(vec![out("Vector", Vector), out("Value", Float)])
            .with_property("mode", "ADD_FLOAT3"),
    ]
}
