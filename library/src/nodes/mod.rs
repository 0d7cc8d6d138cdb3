//! Node type registry: the set of node types the compiler recognizes.

mod definitions;
pub mod node_types;

use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;

use crate::model::graph::SourceNode;
pub use node_types::{NodeCategory, NodeTypeDefinition, type_ids};

static BUILTIN: Lazy<NodeTypeRegistry> = Lazy::new(NodeTypeRegistry::with_builtin_types);

/// Registered node types keyed by `type_id`.
///
/// Filled once before compilation and only read while compiling.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeRegistry {
    types: BTreeMap<String, NodeTypeDefinition>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for def in definitions::all_node_definitions() {
            registry.register(def);
        }
        registry
    }

    /// Process-wide registry of the built-in node types.
    pub fn builtin() -> &'static NodeTypeRegistry {
        &BUILTIN
    }

    pub fn register(&mut self, def: NodeTypeDefinition) {
        debug!("Registering node type '{}'", def.type_id);
        self.types.insert(def.type_id.clone(), def);
    }

    pub fn get(&self, type_id: &str) -> Option<&NodeTypeDefinition> {
        self.types.get(type_id)
    }

    pub fn is_registered(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeTypeDefinition> {
        self.types.values()
    }

    pub fn by_category(&self, category: NodeCategory) -> Vec<&NodeTypeDefinition> {
        self.types
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Create a node of a registered type, as the editor does when a node is added.
    pub fn instantiate(&self, type_id: &str, name: &str) -> Option<SourceNode> {
        self.get(type_id).map(|def| def.instantiate(name))
    }
}
