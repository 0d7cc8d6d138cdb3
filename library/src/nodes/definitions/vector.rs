use super::{float_in, node, out, vector_in};
use crate::model::graph::SocketType;
use crate::nodes::node_types::{NodeCategory, NodeTypeDefinition, type_ids};

pub(super) fn vector_nodes() -> Vec<NodeTypeDefinition> {
    use SocketType::*;
    let nc = NodeCategory::Vector;
    vec![
        node(type_ids::SEPARATE_VECTOR, "Separate Vector", nc)
            .with_description("Separate vector into elements")
            .with_inputs(vec![vector_in("Vector", 0.0, 0.0, 0.0)])
            .with_outputs(vec![out("X", Float), out("Y", Float), out("Z", Float)]),
        node(type_ids::COMBINE_VECTOR, "Combine Vector", nc)
            .with_description("Combine vector from component values")
            .with_inputs(vec![float_in("X"), float_in("Y"), float_in("Z")])
            .with_outputs(vec![out("Vector", Vector)]),
    ]
}
