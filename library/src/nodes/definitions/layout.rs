use super::{inp, node, out};
use crate::model::graph::SocketType;
use crate::nodes::node_types::{NodeCategory, NodeTypeDefinition, type_ids};

/// Organizational nodes. They are registered but have no lowering, so they
/// and every link touching them are left out of the IR.
pub(super) fn layout_nodes() -> Vec<NodeTypeDefinition> {
    let nc = NodeCategory::Layout;
    vec![
        node(type_ids::FRAME, "Frame", nc).with_description("Visual grouping of nodes"),
        node(type_ids::REROUTE, "Reroute", nc)
            .with_inputs(vec![inp("Input", SocketType::Float)])
            .with_outputs(vec![out("Output", SocketType::Float)]),
    ]
}
