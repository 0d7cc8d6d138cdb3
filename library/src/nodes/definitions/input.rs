use super::{node, out};
use crate::model::graph::SocketType;
use crate::nodes::node_types::{NodeCategory, NodeTypeDefinition, type_ids};

pub(super) fn input_nodes() -> Vec<NodeTypeDefinition> {
    vec![
        node(type_ids::ITERATION, "Iteration", NodeCategory::Input)
            .with_description("Iteration number")
            .with_outputs(vec![out("N", SocketType::Int)]),
    ]
}
