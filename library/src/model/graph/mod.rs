//! Source node tree handed over by the host editor for one compilation.

pub mod connection;
pub mod node;
pub mod property;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

pub use connection::{Link, PinDefinition, PinDirection, Socket, SocketRef, SocketType};
pub use node::SourceNode;
pub use property::{PropertyMap, PropertyValue, Vec3};

/// Ordered nodes and links of one node tree.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SourceGraph {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<SourceNode>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl SourceGraph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn load(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_node(&mut self, node: SourceNode) {
        self.nodes.push(node);
    }

    pub fn node(&self, name: &str) -> Option<&SourceNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut SourceNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Append a link from `from_node`'s output socket to `to_node`'s input
    /// socket and mark both sockets as linked. Returns the link index.
    pub fn add_link(
        &mut self,
        from_node: &str,
        from_socket: usize,
        to_node: &str,
        to_socket: usize,
    ) -> usize {
        if let Some(s) = self
            .node_mut(from_node)
            .and_then(|n| n.outputs.get_mut(from_socket))
        {
            s.is_linked = true;
        }
        if let Some(s) = self
            .node_mut(to_node)
            .and_then(|n| n.inputs.get_mut(to_socket))
        {
            s.is_linked = true;
        }
        self.links.push(Link::new(
            SocketRef::new(from_node, from_socket),
            SocketRef::new(to_node, to_socket),
        ));
        self.links.len() - 1
    }

    /// Recompute every socket's `is_linked` flag from the link list.
    pub fn sync_link_flags(&mut self) {
        for node in &mut self.nodes {
            for s in node.inputs.iter_mut().chain(node.outputs.iter_mut()) {
                s.is_linked = false;
            }
        }
        let links = self.links.clone();
        for link in &links {
            if let Some(s) = self
                .node_mut(&link.from.node)
                .and_then(|n| n.outputs.get_mut(link.from.socket))
            {
                s.is_linked = true;
            }
            if let Some(s) = self
                .node_mut(&link.to.node)
                .and_then(|n| n.inputs.get_mut(link.to.socket))
            {
                s.is_linked = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> SourceGraph {
        let mut graph = SourceGraph::new("tree");
        graph.add_node(
            SourceNode::new("A", "math.math")
                .with_outputs(vec![Socket::new("Value", SocketType::Float)]),
        );
        graph.add_node(
            SourceNode::new("B", "math.math")
                .with_inputs(vec![Socket::new("Value", SocketType::Float)]),
        );
        graph
    }

    #[test]
    fn test_add_link_marks_sockets() {
        let mut graph = two_nodes();
        let index = graph.add_link("A", 0, "B", 0);
        assert_eq!(index, 0);
        assert!(graph.node("A").unwrap().outputs[0].is_linked);
        assert!(graph.node("B").unwrap().inputs[0].is_linked);
    }

    #[test]
    fn test_sync_link_flags() {
        let mut graph = two_nodes();
        graph.add_link("A", 0, "B", 0);
        graph.links.clear();
        graph.sync_link_flags();
        assert!(!graph.node("B").unwrap().inputs[0].is_linked);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut graph = two_nodes();
        graph.add_link("A", 0, "B", 0);
        graph.links[0].is_valid = false;
        let json = graph.save().unwrap();
        let loaded = SourceGraph::load(&json).unwrap();
        assert_eq!(graph, loaded);
    }

    #[test]
    fn test_link_validity_defaults_to_true() {
        let json = r#"{
            "nodes": [],
            "links": [{"from": {"node": "A", "socket": 0}, "to": {"node": "B", "socket": 1}}]
        }"#;
        let graph = SourceGraph::load(json).unwrap();
        assert!(graph.links[0].is_valid);
        assert_eq!(graph.links[0].to, SocketRef::new("B", 1));
    }
}
