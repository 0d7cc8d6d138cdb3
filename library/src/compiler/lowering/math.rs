//! Scalar and vector math lowering.
//!
//! Both node types carry a `mode` property naming the primitive to emit.
//! Binary modes consume both input sockets in order; unary modes consume one
//! socket, chosen by [`unary_input_socket`].

use super::{NodeLowering, unresolved};
use crate::compiler::context::{IrNodeHandle, NodeCompiler};
use crate::error::CompileError;
use crate::ir::OpCode;
use crate::model::graph::{Socket, SourceNode};
use crate::nodes::type_ids;

const DEFAULT_MATH_MODE: &str = "ADD_FLOAT";
const DEFAULT_VECTOR_MATH_MODE: &str = "ADD_FLOAT3";

// Mode tables list the items in enum order: a mode given as an integer is
// the item's index.
const MATH_MODES: &[OpCode] = &[
    OpCode::AddFloat,
    OpCode::SubFloat,
    OpCode::MulFloat,
    OpCode::DivFloat,
    OpCode::Sine,
    OpCode::Cosine,
    OpCode::Tangent,
    OpCode::Arcsine,
    OpCode::Arccosine,
    OpCode::Arctangent,
    OpCode::Power,
    OpCode::Logarithm,
    OpCode::Minimum,
    OpCode::Maximum,
    OpCode::Round,
    OpCode::LessThan,
    OpCode::GreaterThan,
    OpCode::Modulo,
    OpCode::Absolute,
    OpCode::Clamp,
];

const MATH_BINARY: &[OpCode] = &[
    OpCode::AddFloat,
    OpCode::SubFloat,
    OpCode::MulFloat,
    OpCode::DivFloat,
    OpCode::Power,
    OpCode::Logarithm,
    OpCode::Minimum,
    OpCode::Maximum,
    OpCode::LessThan,
    OpCode::GreaterThan,
    OpCode::Modulo,
];

const VECTOR_MATH_MODES: &[OpCode] = &[
    OpCode::AddFloat3,
    OpCode::SubFloat3,
    OpCode::AverageFloat3,
    OpCode::DotFloat3,
    OpCode::CrossFloat3,
    OpCode::NormalizeFloat3,
];

const VECTOR_MATH_BINARY: &[OpCode] = &[
    OpCode::AddFloat3,
    OpCode::SubFloat3,
    OpCode::AverageFloat3,
    OpCode::DotFloat3,
    OpCode::CrossFloat3,
];

// Modes producing a vector result, a scalar result, or (NORMALIZE) both.
const VECTOR_MATH_VECTOR_OUT: &[OpCode] = &[
    OpCode::AddFloat3,
    OpCode::SubFloat3,
    OpCode::AverageFloat3,
    OpCode::CrossFloat3,
    OpCode::NormalizeFloat3,
];

const VECTOR_MATH_VALUE_OUT: &[OpCode] = &[OpCode::DotFloat3, OpCode::NormalizeFloat3];

/// Resolve the node's `mode` to one of `allowed`, by item name or item
/// index. Only a node without a `mode` gets `default`.
fn resolve_mode(
    node: &SourceNode,
    allowed: &[OpCode],
    default: &'static str,
) -> Result<OpCode, CompileError> {
    let Some(value) = node.property("mode") else {
        return OpCode::from_name(default).ok_or_else(|| unresolved(node, "mode", default));
    };
    let by_name = value
        .as_str()
        .and_then(OpCode::from_name)
        .filter(|op| allowed.contains(op));
    let by_index = value
        .as_integer()
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| allowed.get(index).copied());
    by_name
        .or(by_index)
        .ok_or_else(|| unresolved(node, "mode", value))
}

/// Input socket that feeds a unary operation.
///
/// Socket 0 wins unless it is absent (hidden or unlinked) while socket 1 is
/// present; when neither is present socket 0 supplies its default.
pub(crate) fn unary_input_socket(node: &SourceNode) -> usize {
    let present = |index| node.input(index).is_some_and(Socket::is_connected);
    if !present(0) && present(1) { 1 } else { 0 }
}

fn map_operands(
    node: &SourceNode,
    compiler: &mut NodeCompiler,
    op: IrNodeHandle,
    binary: bool,
) -> Result<(), CompileError> {
    if binary {
        compiler.map_input(0, op.input(0)?)?;
        compiler.map_input(1, op.input(1)?)
    } else {
        compiler.map_input(unary_input_socket(node), op.input(0)?)
    }
}

/// `math.math`: one scalar primitive selected by `mode`.
pub struct MathLowering;

impl NodeLowering for MathLowering {
    fn handles(&self) -> &[&str] {
        &[type_ids::MATH]
    }

    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        let mode = resolve_mode(node, MATH_MODES, DEFAULT_MATH_MODE)?;
        let op = compiler.add_node(mode, Some(&format!("{}N", node.name)))?;
        map_operands(node, compiler, op, MATH_BINARY.contains(&mode))?;
        compiler.map_output(0, op.output(0)?)
    }
}

/// `math.vector_math`: one vector primitive selected by `mode`.
///
/// Output socket 0 is the vector result and socket 1 the scalar result; a
/// primitive with a single scalar output feeds socket 1.
pub struct VectorMathLowering;

impl NodeLowering for VectorMathLowering {
    fn handles(&self) -> &[&str] {
        &[type_ids::VECTOR_MATH]
    }

    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        let mode = resolve_mode(node, VECTOR_MATH_MODES, DEFAULT_VECTOR_MATH_MODE)?;
        let op = compiler.add_node(mode, Some(&format!("{}N", node.name)))?;
        map_operands(node, compiler, op, VECTOR_MATH_BINARY.contains(&mode))?;

        let vector_out = VECTOR_MATH_VECTOR_OUT.contains(&mode);
        let value_out = VECTOR_MATH_VALUE_OUT.contains(&mode);
        match (vector_out, value_out) {
            (true, true) => {
                compiler.map_output(0, op.output(0)?)?;
                compiler.map_output(1, op.output(1)?)
            }
            (true, false) => compiler.map_output(0, op.output(0)?),
            (false, true) => compiler.map_output(1, op.output(0)?),
            (false, false) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::PropertyValue;
    use crate::nodes::NodeTypeRegistry;

    fn math_node(mode: &str) -> SourceNode {
        NodeTypeRegistry::builtin()
            .instantiate(type_ids::MATH, "Math")
            .unwrap()
            .with_property("mode", mode)
    }

    fn link_input(node: &mut SourceNode, index: usize) {
        node.input_mut(index).unwrap().is_linked = true;
    }

    #[test]
    fn test_mode_sets_are_consistent() {
        assert_eq!(MATH_MODES.len(), 20);
        assert!(MATH_BINARY.iter().all(|op| MATH_MODES.contains(op)));
        assert!(VECTOR_MATH_BINARY.iter().all(|op| VECTOR_MATH_MODES.contains(op)));
        for op in VECTOR_MATH_MODES {
            assert!(
                VECTOR_MATH_VECTOR_OUT.contains(op) || VECTOR_MATH_VALUE_OUT.contains(op),
                "{} produces nothing",
                op
            );
        }
    }

    #[test]
    fn test_binary_modes_take_two_inputs() {
        for op in MATH_BINARY.iter().chain(VECTOR_MATH_BINARY) {
            assert_eq!(op.signature().inputs.len(), 2, "{}", op);
        }
    }

    #[test]
    fn test_resolve_mode() {
        let node = math_node("SINE");
        assert_eq!(
            resolve_mode(&node, MATH_MODES, DEFAULT_MATH_MODE).unwrap(),
            OpCode::Sine
        );
        // Vector mode on a scalar node
        let node = math_node("ADD_FLOAT3");
        assert!(matches!(
            resolve_mode(&node, MATH_MODES, DEFAULT_MATH_MODE),
            Err(CompileError::UnresolvedEnum { .. })
        ));
    }

    #[test]
    fn test_missing_mode_uses_default() {
        let mut node = math_node("SINE");
        node.properties = Default::default();
        assert_eq!(
            resolve_mode(&node, MATH_MODES, DEFAULT_MATH_MODE).unwrap(),
            OpCode::AddFloat
        );
    }

    #[test]
    fn test_integer_mode_resolves_by_item_index() {
        let mut node = math_node("SINE");
        node.properties.set("mode", PropertyValue::Integer(3));
        assert_eq!(
            resolve_mode(&node, MATH_MODES, DEFAULT_MATH_MODE).unwrap(),
            OpCode::DivFloat
        );
        node.properties.set("mode", PropertyValue::Integer(5));
        assert_eq!(
            resolve_mode(&node, VECTOR_MATH_MODES, DEFAULT_VECTOR_MATH_MODE).unwrap(),
            OpCode::NormalizeFloat3
        );
    }

    #[test]
    fn test_unresolvable_mode_values_are_rejected() {
        let bad = [
            PropertyValue::Integer(20),
            PropertyValue::Integer(-1),
            PropertyValue::Boolean(true),
            PropertyValue::from(3.0),
        ];
        for value in bad {
            let mut node = math_node("SINE");
            node.properties.set("mode", value.clone());
            assert!(
                matches!(
                    resolve_mode(&node, MATH_MODES, DEFAULT_MATH_MODE),
                    Err(CompileError::UnresolvedEnum { .. })
                ),
                "{}",
                value
            );
        }
    }

    #[test]
    fn test_unary_socket_selection() {
        let mut node = math_node("SINE");
        assert_eq!(unary_input_socket(&node), 0);

        link_input(&mut node, 1);
        assert_eq!(unary_input_socket(&node), 1);

        link_input(&mut node, 0);
        assert_eq!(unary_input_socket(&node), 0);
    }

    #[test]
    fn test_unary_socket_ignores_hidden_inputs() {
        let mut node = math_node("SINE");
        link_input(&mut node, 0);
        link_input(&mut node, 1);
        node.input_mut(0).unwrap().hide = true;
        assert_eq!(unary_input_socket(&node), 1);

        node.input_mut(1).unwrap().hide = true;
        assert_eq!(unary_input_socket(&node), 0);
    }
}
