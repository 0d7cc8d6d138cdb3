//! Node lowering implementations, one per node type family.

pub mod input;
pub mod math;
pub mod transform;
pub mod vector;

use once_cell::sync::Lazy;

use super::context::NodeCompiler;
use crate::error::CompileError;
use crate::model::graph::SourceNode;

static BUILTIN: Lazy<LoweringTable> = Lazy::new(LoweringTable::with_default_lowerings);

/// Trait for lowering a family of node types into IR.
///
/// Each implementation handles one or more exact `type_id`s. A registered
/// node type that no implementation handles (layout nodes) compiles to nothing.
pub trait NodeLowering: Send + Sync {
    /// The `type_id`s this lowering handles.
    fn handles(&self) -> &[&str];

    /// Emit IR for `node` through `compiler`.
    ///
    /// Runs inside the node's scope: use `compiler.add_node()` to create
    /// primitives and `compiler.map_input()` / `map_output()` to publish
    /// which IR slots the node's sockets resolve to.
    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError>;
}

/// Lookup table from node type to lowering procedure.
pub struct LoweringTable {
    lowerings: Vec<Box<dyn NodeLowering>>,
}

impl LoweringTable {
    pub fn new() -> Self {
        Self {
            lowerings: Vec::new(),
        }
    }

    /// Create a table with all built-in lowerings registered.
    pub fn with_default_lowerings() -> Self {
        let mut table = Self::new();
        table.register(Box::new(input::IterationLowering));
        table.register(Box::new(math::MathLowering));
        table.register(Box::new(math::VectorMathLowering));
        table.register(Box::new(vector::SeparateVectorLowering));
        table.register(Box::new(vector::CombineVectorLowering));
        table.register(Box::new(transform::ConstructTransformLowering));
        table.register(Box::new(transform::ExtractTransformLowering));
        table
    }

    pub fn builtin() -> &'static LoweringTable {
        &BUILTIN
    }

    pub fn register(&mut self, lowering: Box<dyn NodeLowering>) {
        self.lowerings.push(lowering);
    }

    /// Find the lowering that handles a given type_id.
    pub fn find(&self, type_id: &str) -> Option<&dyn NodeLowering> {
        self.lowerings
            .iter()
            .find(|l| l.handles().iter().any(|h| *h == type_id))
            .map(|l| l.as_ref())
    }
}

impl Default for LoweringTable {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn unresolved(node: &SourceNode, property: &str, value: impl ToString) -> CompileError {
    CompileError::UnresolvedEnum {
        node: node.name.clone(),
        property: property.to_string(),
        value: value.to_string(),
    }
}
