//! Lowering for graph input nodes.

use super::NodeLowering;
use crate::compiler::context::NodeCompiler;
use crate::error::CompileError;
use crate::model::graph::SourceNode;
use crate::nodes::type_ids;

/// `input.iteration`: exposes the VM's iteration counter. Emits no primitive
/// of its own; the output maps straight onto the argument node.
pub struct IterationLowering;

impl NodeLowering for IterationLowering {
    fn handles(&self) -> &[&str] {
        &[type_ids::ITERATION]
    }

    fn lower(&self, _node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        let iteration = compiler.graph_input("iteration")?;
        compiler.map_output(0, iteration.output(0)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{CompilerOptions, GraphCompiler};
    use crate::error::CompileError;
    use crate::ir::OpCode;
    use crate::model::graph::SourceGraph;
    use crate::nodes::{NodeTypeRegistry, type_ids};

    fn iteration_graph() -> SourceGraph {
        let registry = NodeTypeRegistry::builtin();
        let mut graph = SourceGraph::new("tree");
        graph.add_node(registry.instantiate(type_ids::ITERATION, "Iteration").unwrap());
        graph.add_node(registry.instantiate(type_ids::MATH, "Math").unwrap());
        graph.add_link("Iteration", 0, "Math", 0);
        graph
    }

    #[test]
    fn test_iteration_feeds_argument_node() {
        let ir = GraphCompiler::new(CompilerOptions::default())
            .compile(&iteration_graph())
            .unwrap();
        let arg = ir.input_node("iteration").unwrap();
        assert_eq!(ir.node(arg).unwrap().op, OpCode::ArgInt);
        // Only the argument and the math primitive exist.
        assert_eq!(ir.len(), 2);
        assert_eq!(ir.node(arg).unwrap().outputs[0].links.len(), 1);
    }

    #[test]
    fn test_missing_iteration_input_is_an_error() {
        let options = CompilerOptions {
            graph_inputs: Vec::new(),
            ..CompilerOptions::default()
        };
        let err = GraphCompiler::new(options)
            .compile(&iteration_graph())
            .unwrap_err();
        assert_eq!(err.node(), Some("Iteration"));
        match err {
            CompileError::Lowering { source, .. } => {
                assert!(matches!(*source, CompileError::UnknownGraphInput(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
