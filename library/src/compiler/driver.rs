//! Traversal driver: lowers every node of a source tree, then wires the
//! tree's links through the boundary mappings the lowerings published.

use std::collections::HashSet;

use log::{debug, error, info, warn};

use super::context::NodeCompiler;
use super::lowering::LoweringTable;
use super::options::CompilerOptions;
use crate::error::CompileError;
use crate::ir::{DuplicateLinkPolicy, InputState, IrGraph};
use crate::model::graph::{Link, SourceGraph};
use crate::nodes::NodeTypeRegistry;
use crate::util::timing::ScopedTimer;

/// Compiles source trees against a node type registry and lowering table.
pub struct GraphCompiler<'r> {
    registry: &'r NodeTypeRegistry,
    lowerings: &'r LoweringTable,
    options: CompilerOptions,
}

impl GraphCompiler<'static> {
    /// Compiler over the built-in node types and lowerings.
    pub fn new(options: CompilerOptions) -> Self {
        Self::with_tables(NodeTypeRegistry::builtin(), LoweringTable::builtin(), options)
    }
}

impl<'r> GraphCompiler<'r> {
    pub fn with_tables(
        registry: &'r NodeTypeRegistry,
        lowerings: &'r LoweringTable,
        options: CompilerOptions,
    ) -> Self {
        Self {
            registry,
            lowerings,
            options,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Lower `graph` into a fresh IR graph.
    ///
    /// Nodes are visited in tree order. Unregistered nodes, repeated node
    /// names and registered nodes without a lowering emit nothing; links
    /// touching them are dropped. A failing lowering aborts the compile with
    /// an error naming the node.
    pub fn compile(&self, graph: &SourceGraph) -> Result<IrGraph, CompileError> {
        let _timer = ScopedTimer::debug_lazy(|| format!("Compiling tree '{}'", graph.name));
        let mut compiler = NodeCompiler::new(&self.options);

        let mut lowered = 0;
        let mut seen = HashSet::new();
        for node in &graph.nodes {
            if !seen.insert(node.name.as_str()) {
                warn!("Node name '{}' used more than once, later node skipped", node.name);
                continue;
            }
            if !self.registry.is_registered(&node.type_id) {
                warn!(
                    "Node '{}' has unregistered type '{}', skipped",
                    node.name, node.type_id
                );
                continue;
            }
            let Some(lowering) = self.lowerings.find(&node.type_id) else {
                debug!("Node '{}' ({}) compiles to nothing", node.name, node.type_id);
                continue;
            };
            debug!("Lowering node '{}' ({})", node.name, node.type_id);
            compiler
                .with_node_scope(node, |c| lowering.lower(node, c))
                .map_err(|e| e.in_node(&node.name))
                .inspect_err(|e| error!("Failed to compile node '{}': {}", node.name, e))?;
            lowered += 1;
        }

        let mut wired = 0;
        for link in &graph.links {
            if self.wire_link(&mut compiler, link)? {
                wired += 1;
            }
        }

        let ir = compiler.finish();
        ir.validate()?;
        info!(
            "Compiled tree '{}': {} of {} nodes lowered, {} of {} links wired, {} IR nodes",
            graph.name,
            lowered,
            graph.nodes.len(),
            wired,
            graph.links.len(),
            ir.len()
        );
        Ok(ir)
    }

    /// Connect the IR slots behind one source link. Returns whether anything
    /// was connected.
    ///
    /// A second source link into an already linked socket is dropped with a
    /// warning, unless the policy lets the last writer win.
    fn wire_link(&self, compiler: &mut NodeCompiler, link: &Link) -> Result<bool, CompileError> {
        let describe = || {
            format!(
                "{}[{}] -> {}[{}]",
                link.from.node, link.from.socket, link.to.node, link.to.socket
            )
        };
        if !link.is_valid {
            debug!("Invalid link {} dropped", describe());
            return Ok(false);
        }
        let Some(from) = compiler.mapped_output(&link.from) else {
            debug!("Link {} has no mapped source, dropped", describe());
            return Ok(false);
        };
        let targets = compiler.mapped_inputs(&link.to).to_vec();
        if targets.is_empty() {
            debug!("Link {} has no mapped target, dropped", describe());
            return Ok(false);
        }
        let occupied = targets
            .iter()
            .any(|to| matches!(compiler.ir().input_state(*to), Some(InputState::Link(_))));
        if occupied && self.options.duplicate_links == DuplicateLinkPolicy::Error {
            warn!(
                "Link {} targets an input that is already linked, dropped",
                describe()
            );
            return Ok(false);
        }
        for to in targets {
            compiler
                .link(from, to)
                .inspect_err(|e| error!("Failed to wire link {}: {}", describe(), e))?;
        }
        Ok(true)
    }
}

/// Compile `graph` with the built-in node types and default options.
pub fn compile_graph(graph: &SourceGraph) -> Result<IrGraph, CompileError> {
    GraphCompiler::new(CompilerOptions::default()).compile(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lowering::NodeLowering;
    use crate::ir::{InputState, OpCode};
    use crate::model::graph::SourceNode;
    use crate::nodes::type_ids;

    fn instantiate(type_id: &str, name: &str) -> SourceNode {
        NodeTypeRegistry::builtin().instantiate(type_id, name).unwrap()
    }

    #[test]
    fn test_empty_tree_has_only_arguments() {
        let ir = compile_graph(&SourceGraph::new("empty")).unwrap();
        assert_eq!(ir.len(), 1);
        assert!(ir.input_node("iteration").is_some());
    }

    #[test]
    fn test_link_wires_mapped_slots() {
        let mut graph = SourceGraph::new("tree");
        graph.add_node(instantiate(type_ids::COMBINE_VECTOR, "Comb"));
        graph.add_node(instantiate(type_ids::SEPARATE_VECTOR, "Sep"));
        graph.add_link("Comb", 0, "Sep", 0);

        let ir = compile_graph(&graph).unwrap();
        let comb = ir.find_node("CombN").unwrap();
        // One source link fans out to all three element nodes.
        assert_eq!(comb.outputs[0].links.len(), 3);
        assert_eq!(ir.connections().len(), 3);
    }

    #[test]
    fn test_link_to_layout_node_is_dropped() {
        let mut graph = SourceGraph::new("tree");
        graph.add_node(instantiate(type_ids::MATH, "Math"));
        graph.add_node(instantiate(type_ids::REROUTE, "Reroute"));
        graph.add_link("Math", 0, "Reroute", 0);

        let ir = compile_graph(&graph).unwrap();
        assert!(ir.connections().is_empty());
        assert_eq!(ir.nodes_from("Reroute").count(), 0);
    }

    struct FailingLowering;

    impl NodeLowering for FailingLowering {
        fn handles(&self) -> &[&str] {
            &[type_ids::MATH]
        }

        fn lower(&self, node: &SourceNode, _: &mut NodeCompiler) -> Result<(), CompileError> {
            Err(CompileError::InvalidArgument(format!("cannot lower {}", node.name)))
        }
    }

    #[test]
    fn test_lowering_failure_aborts_compile() {
        let mut lowerings = LoweringTable::new();
        lowerings.register(Box::new(FailingLowering));
        let compiler = GraphCompiler::with_tables(
            NodeTypeRegistry::builtin(),
            &lowerings,
            CompilerOptions::default(),
        );
        let mut graph = SourceGraph::new("tree");
        graph.add_node(instantiate(type_ids::MATH, "Math"));
        let err = compiler.compile(&graph).unwrap_err();
        assert_eq!(err.node(), Some("Math"));
        assert!(matches!(err, CompileError::Lowering { .. }));
    }

    #[test]
    fn test_repeated_node_name_is_skipped() {
        let mut graph = SourceGraph::new("tree");
        graph.add_node(instantiate(type_ids::MATH, "A").with_property("mode", "SINE"));
        graph.add_node(instantiate(type_ids::MATH, "A").with_property("mode", "COSINE"));
        graph.add_node(instantiate(type_ids::MATH, "B"));
        graph.add_link("A", 0, "B", 0);

        let ir = compile_graph(&graph).unwrap();
        let emitted: Vec<OpCode> = ir.nodes_from("A").map(|n| n.op).collect();
        assert_eq!(emitted, vec![OpCode::Sine]);
        assert!(matches!(
            ir.find_node("BN").unwrap().inputs[0].state,
            InputState::Link(_)
        ));
    }

    #[test]
    fn test_custom_table_skips_types_without_lowering() {
        let lowerings = LoweringTable::new();
        let compiler = GraphCompiler::with_tables(
            NodeTypeRegistry::builtin(),
            &lowerings,
            CompilerOptions::default(),
        );
        let mut graph = SourceGraph::new("tree");
        graph.add_node(instantiate(type_ids::MATH, "Math"));
        let ir = compiler.compile(&graph).unwrap();
        assert_eq!(ir.nodes_from("Math").count(), 0);
    }

    #[test]
    fn test_linked_slot_keeps_link_over_default() {
        let mut graph = SourceGraph::new("tree");
        graph.add_node(instantiate(type_ids::MATH, "A").with_property("mode", "SINE"));
        graph.add_node(instantiate(type_ids::MATH, "B"));
        graph.add_link("A", 0, "B", 1);

        let ir = compile_graph(&graph).unwrap();
        let b = ir.find_node("BN").unwrap();
        assert_eq!(b.op, OpCode::AddFloat);
        assert!(matches!(b.inputs[1].state, InputState::Link(_)));
    }
}
