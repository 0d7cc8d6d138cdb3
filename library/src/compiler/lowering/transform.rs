//! Transform construction and decomposition.
//!
//! Constructors build a matrix from their parameters and multiply the
//! incoming transform (socket 0) by it, so the incoming transform is always
//! the left operand. Decomposers map one primitive's outputs straight to the
//! node's outputs.

use super::{NodeLowering, unresolved};
use crate::compiler::context::NodeCompiler;
use crate::error::CompileError;
use crate::ir::{OpCode, Value};
use crate::model::graph::{PropertyValue, SourceNode};
use crate::nodes::type_ids;

const EULER_ORDER_PROPERTY: &str = "euler_order";

/// Rotation orders understood by the VM, with their integer codes.
const EULER_ORDERS: [(&str, i32); 6] = [
    ("XYZ", 1),
    ("XZY", 2),
    ("YXZ", 3),
    ("YZX", 4),
    ("ZXY", 5),
    ("ZYX", 6),
];

// (source socket, constructor slot) pairs
const TRANSLATION_PARAMS: &[(usize, &str)] = &[(1, "loc")];
const EULER_PARAMS: &[(usize, &str)] = &[(1, "euler")];
const AXIS_ANGLE_PARAMS: &[(usize, &str)] = &[(1, "axis"), (2, "angle")];
const SCALE_PARAMS: &[(usize, &str)] = &[(1, "scale")];

/// Integer code of the node's euler order. The property may hold the order
/// name or the code itself; a node without one rotates in XYZ order.
pub(crate) fn euler_order_code(node: &SourceNode) -> Result<i32, CompileError> {
    match node.property(EULER_ORDER_PROPERTY) {
        None => Ok(EULER_ORDERS[0].1),
        Some(PropertyValue::String(name)) => EULER_ORDERS
            .iter()
            .find(|(order, _)| order == name)
            .map(|(_, code)| *code)
            .ok_or_else(|| unresolved(node, EULER_ORDER_PROPERTY, name)),
        Some(PropertyValue::Integer(code))
            if EULER_ORDERS.iter().any(|(_, c)| i64::from(*c) == *code) =>
        {
            Ok(*code as i32)
        }
        Some(other) => Err(unresolved(node, EULER_ORDER_PROPERTY, other)),
    }
}

/// Constructors: `transform.translation`, `transform.euler`,
/// `transform.axis_angle` and `transform.scale`.
pub struct ConstructTransformLowering;

impl NodeLowering for ConstructTransformLowering {
    fn handles(&self) -> &[&str] {
        &[
            type_ids::TRANSLATION_TRANSFORM,
            type_ids::EULER_TRANSFORM,
            type_ids::AXIS_ANGLE_TRANSFORM,
            type_ids::SCALE_TRANSFORM,
        ]
    }

    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        let (op, params) = match node.type_id.as_str() {
            type_ids::TRANSLATION_TRANSFORM => (OpCode::LocToMatrix44, TRANSLATION_PARAMS),
            type_ids::EULER_TRANSFORM => (OpCode::EulerToMatrix44, EULER_PARAMS),
            type_ids::AXIS_ANGLE_TRANSFORM => (OpCode::AxisangleToMatrix44, AXIS_ANGLE_PARAMS),
            type_ids::SCALE_TRANSFORM => (OpCode::ScaleToMatrix44, SCALE_PARAMS),
            other => {
                return Err(CompileError::InvalidArgument(format!(
                    "No transform constructor for '{}'",
                    other
                )));
            }
        };

        let construct = compiler.add_node(op, None)?;
        if op == OpCode::EulerToMatrix44 {
            let order = euler_order_code(node)?;
            compiler.set_value(construct.input_named("order")?, Value::int(order))?;
        }
        for (socket, slot) in params {
            compiler.map_input(*socket, construct.input_named(slot)?)?;
        }

        let mul = compiler.add_node(OpCode::MulMatrix44, None)?;
        compiler.map_input(0, mul.input_named("a")?)?;
        compiler.link(construct.output(0)?, mul.input_named("b")?)?;
        compiler.map_output(0, mul.output(0)?)
    }
}

/// Decomposers: `transform.get_translation`, `transform.get_euler`,
/// `transform.get_axis_angle` and `transform.get_scale`.
pub struct ExtractTransformLowering;

impl NodeLowering for ExtractTransformLowering {
    fn handles(&self) -> &[&str] {
        &[
            type_ids::GET_TRANSLATION,
            type_ids::GET_EULER,
            type_ids::GET_AXIS_ANGLE,
            type_ids::GET_SCALE,
        ]
    }

    fn lower(&self, node: &SourceNode, compiler: &mut NodeCompiler) -> Result<(), CompileError> {
        let op = match node.type_id.as_str() {
            type_ids::GET_TRANSLATION => OpCode::Matrix44ToLoc,
            type_ids::GET_EULER => OpCode::Matrix44ToEuler,
            type_ids::GET_AXIS_ANGLE => OpCode::Matrix44ToAxisangle,
            type_ids::GET_SCALE => OpCode::Matrix44ToScale,
            other => {
                return Err(CompileError::InvalidArgument(format!(
                    "No transform decomposer for '{}'",
                    other
                )));
            }
        };

        let extract = compiler.add_node(op, None)?;
        if op == OpCode::Matrix44ToEuler {
            let order = euler_order_code(node)?;
            compiler.set_value(extract.input_named("order")?, Value::int(order))?;
        }
        compiler.map_input(0, extract.input_named("matrix")?)?;
        for slot in 0..op.signature().outputs.len() {
            compiler.map_output(slot, extract.output(slot)?)?;
        }
        Ok(())
    }
}
