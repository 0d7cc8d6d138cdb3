//! Vector component split and combine.

use super::NodeLowering;
use crate::compiler::context::NodeCompiler;
use crate::error::CompileError;
use crate::ir::{OpCode, Value};
use crate::model::graph::SourceNode;
use crate::nodes::type_ids;

const COMPONENTS: [&str; 3] = ["X", "Y", "Z"];

/// `vector.separate`: one element extraction per component.
pub struct SeparateVectorLowering;

impl NodeLowering for SeparateVectorLowering {
    fn handles(&self) -> &[&str] {
        &[type_ids::SEPARATE_VECTOR]
    }

    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        for (index, component) in COMPONENTS.iter().enumerate() {
            let name = format!("{}{}", node.name, component);
            let elem = compiler.add_node(OpCode::GetElemFloat3, Some(&name))?;
            compiler.set_value(elem.input_named("index")?, Value::int(index as i32))?;
            compiler.map_input(0, elem.input_named("value")?)?;
            compiler.map_output(index, elem.output_named("value")?)?;
        }
        Ok(())
    }
}

/// `vector.combine`: a single vector constructor.
pub struct CombineVectorLowering;

impl NodeLowering for CombineVectorLowering {
    fn handles(&self) -> &[&str] {
        &[type_ids::COMBINE_VECTOR]
    }

    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        let combine = compiler.add_node(OpCode::SetFloat3, Some(&format!("{}N", node.name)))?;
        for index in 0..COMPONENTS.len() {
            compiler.map_input(index, combine.input(index)?)?;
        }
        compiler.map_output(0, combine.output(0)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::compile_graph;
    use crate::ir::{InputState, OpCode, Value};
    use crate::model::graph::{PropertyValue, SourceGraph, Vec3};
    use crate::nodes::{NodeTypeRegistry, type_ids};

    #[test]
    fn test_separate_emits_indexed_elements() {
        let mut node = NodeTypeRegistry::builtin()
            .instantiate(type_ids::SEPARATE_VECTOR, "Sep")
            .unwrap();
        node.input_mut(0).unwrap().default_value =
            Some(PropertyValue::from(Vec3::new(1.0, 2.0, 3.0)));
        let mut graph = SourceGraph::new("tree");
        graph.add_node(node);

        let ir = compile_graph(&graph).unwrap();
        for (index, name) in ["SepX", "SepY", "SepZ"].iter().enumerate() {
            let elem = ir.find_node(name).unwrap();
            assert_eq!(elem.op, OpCode::GetElemFloat3);
            assert_eq!(elem.source.as_deref(), Some("Sep"));
            assert_eq!(
                elem.inputs[0].state,
                InputState::Value(Value::int(index as i32))
            );
            // The vector default reaches every element node.
            assert_eq!(
                elem.inputs[1].state,
                InputState::Value(Value::float3(1.0, 2.0, 3.0))
            );
        }
    }

    #[test]
    fn test_combine_threads_component_defaults() {
        let mut node = NodeTypeRegistry::builtin()
            .instantiate(type_ids::COMBINE_VECTOR, "Comb")
            .unwrap();
        node.input_mut(2).unwrap().default_value = Some(PropertyValue::from(4.0));
        let mut graph = SourceGraph::new("tree");
        graph.add_node(node);

        let ir = compile_graph(&graph).unwrap();
        let combine = ir.find_node("CombN").unwrap();
        assert_eq!(combine.op, OpCode::SetFloat3);
        assert_eq!(combine.inputs[2].state, InputState::Value(Value::float(4.0)));
    }
}
