//! Primitive operations understood by the node VM and their slot signatures.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{Value, ValueType};

/// Declaration of one input slot: name and default literal (which also fixes
/// the slot type).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputDecl {
    pub name: &'static str,
    pub default: Value,
}

impl InputDecl {
    pub const fn value_type(&self) -> ValueType {
        self.default.value_type()
    }
}

/// Declaration of one output slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputDecl {
    pub name: &'static str,
    pub value_type: ValueType,
}

/// Fixed-arity slot layout of an opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpSignature {
    pub inputs: &'static [InputDecl],
    pub outputs: &'static [OutputDecl],
}

impl OpSignature {
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|d| d.name == name)
    }

    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|d| d.name == name)
    }
}

const fn inp(name: &'static str, default: Value) -> InputDecl {
    InputDecl { name, default }
}

const fn out(name: &'static str, value_type: ValueType) -> OutputDecl {
    OutputDecl { name, value_type }
}

const F0: Value = Value::float(0.0);
const V0: Value = Value::float3(0.0, 0.0, 0.0);
const M: Value = Value::IDENTITY;
// XYZ convention code
const ORDER: Value = Value::int(1);

const IN_FLOAT_2: &[InputDecl] = &[inp("value_a", F0), inp("value_b", F0)];
const IN_FLOAT_1: &[InputDecl] = &[inp("value", F0)];
const IN_FLOAT3_2: &[InputDecl] = &[inp("value_a", V0), inp("value_b", V0)];
const IN_FLOAT3_1: &[InputDecl] = &[inp("value", V0)];
const IN_MATRIX: &[InputDecl] = &[inp("matrix", M)];
const IN_NONE: &[InputDecl] = &[];

const OUT_FLOAT: &[OutputDecl] = &[out("value", ValueType::Float)];
const OUT_FLOAT3: &[OutputDecl] = &[out("value", ValueType::Float3)];
const OUT_MATRIX: &[OutputDecl] = &[out("matrix", ValueType::Matrix44)];

const NORMALIZE_OUT: &[OutputDecl] = &[
    out("vector", ValueType::Float3),
    out("value", ValueType::Float),
];
const GET_ELEM_IN: &[InputDecl] = &[inp("index", Value::int(0)), inp("value", V0)];
const SET_FLOAT3_IN: &[InputDecl] = &[inp("x", F0), inp("y", F0), inp("z", F0)];
const LOC_IN: &[InputDecl] = &[inp("loc", V0)];
const EULER_IN: &[InputDecl] = &[inp("order", ORDER), inp("euler", V0)];
const AXISANGLE_IN: &[InputDecl] = &[
    inp("axis", Value::float3(0.0, 0.0, 1.0)),
    inp("angle", F0),
];
const SCALE_IN: &[InputDecl] = &[inp("scale", Value::float3(1.0, 1.0, 1.0))];
const MUL_MATRIX_IN: &[InputDecl] = &[inp("a", M), inp("b", M)];
const TO_EULER_IN: &[InputDecl] = &[inp("order", ORDER), inp("matrix", M)];
const LOC_OUT: &[OutputDecl] = &[out("loc", ValueType::Float3)];
const EULER_OUT: &[OutputDecl] = &[out("euler", ValueType::Float3)];
const AXISANGLE_OUT: &[OutputDecl] = &[
    out("axis", ValueType::Float3),
    out("angle", ValueType::Float),
];
const SCALE_OUT: &[OutputDecl] = &[out("scale", ValueType::Float3)];
const OUT_INT: &[OutputDecl] = &[out("value", ValueType::Int)];
const OUT_MATRIX_VALUE: &[OutputDecl] = &[out("value", ValueType::Matrix44)];

/// Primitive operation tag.
///
/// The serialized form is the VM's opcode name (`ADD_FLOAT`, `MUL_MATRIX44`, ...).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpCode {
    // Scalar math
    AddFloat,
    SubFloat,
    MulFloat,
    DivFloat,
    Sine,
    Cosine,
    Tangent,
    Arcsine,
    Arccosine,
    Arctangent,
    Power,
    Logarithm,
    Minimum,
    Maximum,
    Round,
    LessThan,
    GreaterThan,
    Modulo,
    Absolute,
    Clamp,
    // Vector math
    AddFloat3,
    SubFloat3,
    AverageFloat3,
    DotFloat3,
    CrossFloat3,
    NormalizeFloat3,
    // Components
    GetElemFloat3,
    SetFloat3,
    // Transforms
    LocToMatrix44,
    EulerToMatrix44,
    AxisangleToMatrix44,
    ScaleToMatrix44,
    MulMatrix44,
    Matrix44ToLoc,
    Matrix44ToEuler,
    Matrix44ToAxisangle,
    Matrix44ToScale,
    // Graph arguments
    ArgFloat,
    ArgInt,
    ArgFloat3,
    ArgMatrix44,
}

impl OpCode {
    pub const ALL: &'static [OpCode] = &[
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
        OpCode::AddFloat3,
        OpCode::SubFloat3,
        OpCode::AverageFloat3,
        OpCode::DotFloat3,
        OpCode::CrossFloat3,
        OpCode::NormalizeFloat3,
        OpCode::GetElemFloat3,
        OpCode::SetFloat3,
        OpCode::LocToMatrix44,
        OpCode::EulerToMatrix44,
        OpCode::AxisangleToMatrix44,
        OpCode::ScaleToMatrix44,
        OpCode::MulMatrix44,
        OpCode::Matrix44ToLoc,
        OpCode::Matrix44ToEuler,
        OpCode::Matrix44ToAxisangle,
        OpCode::Matrix44ToScale,
        OpCode::ArgFloat,
        OpCode::ArgInt,
        OpCode::ArgFloat3,
        OpCode::ArgMatrix44,
    ];

    /// VM opcode name.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::AddFloat => "ADD_FLOAT",
            OpCode::SubFloat => "SUB_FLOAT",
            OpCode::MulFloat => "MUL_FLOAT",
            OpCode::DivFloat => "DIV_FLOAT",
            OpCode::Sine => "SINE",
            OpCode::Cosine => "COSINE",
            OpCode::Tangent => "TANGENT",
            OpCode::Arcsine => "ARCSINE",
            OpCode::Arccosine => "ARCCOSINE",
            OpCode::Arctangent => "ARCTANGENT",
            OpCode::Power => "POWER",
            OpCode::Logarithm => "LOGARITHM",
            OpCode::Minimum => "MINIMUM",
            OpCode::Maximum => "MAXIMUM",
            OpCode::Round => "ROUND",
            OpCode::LessThan => "LESS_THAN",
            OpCode::GreaterThan => "GREATER_THAN",
            OpCode::Modulo => "MODULO",
            OpCode::Absolute => "ABSOLUTE",
            OpCode::Clamp => "CLAMP",
            OpCode::AddFloat3 => "ADD_FLOAT3",
            OpCode::SubFloat3 => "SUB_FLOAT3",
            OpCode::AverageFloat3 => "AVERAGE_FLOAT3",
            OpCode::DotFloat3 => "DOT_FLOAT3",
            OpCode::CrossFloat3 => "CROSS_FLOAT3",
            OpCode::NormalizeFloat3 => "NORMALIZE_FLOAT3",
            OpCode::GetElemFloat3 => "GET_ELEM_FLOAT3",
            OpCode::SetFloat3 => "SET_FLOAT3",
            OpCode::LocToMatrix44 => "LOC_TO_MATRIX44",
            OpCode::EulerToMatrix44 => "EULER_TO_MATRIX44",
            OpCode::AxisangleToMatrix44 => "AXISANGLE_TO_MATRIX44",
            OpCode::ScaleToMatrix44 => "SCALE_TO_MATRIX44",
            OpCode::MulMatrix44 => "MUL_MATRIX44",
            OpCode::Matrix44ToLoc => "MATRIX44_TO_LOC",
            OpCode::Matrix44ToEuler => "MATRIX44_TO_EULER",
            OpCode::Matrix44ToAxisangle => "MATRIX44_TO_AXISANGLE",
            OpCode::Matrix44ToScale => "MATRIX44_TO_SCALE",
            OpCode::ArgFloat => "ARG_FLOAT",
            OpCode::ArgInt => "ARG_INT",
            OpCode::ArgFloat3 => "ARG_FLOAT3",
            OpCode::ArgMatrix44 => "ARG_MATRIX44",
        }
    }

    pub fn from_name(name: &str) -> Option<OpCode> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Argument opcode used to feed an external graph input of the given type.
    pub fn argument_for(value_type: ValueType) -> OpCode {
        match value_type {
            ValueType::Float => OpCode::ArgFloat,
            ValueType::Int => OpCode::ArgInt,
            ValueType::Float3 => OpCode::ArgFloat3,
            ValueType::Matrix44 => OpCode::ArgMatrix44,
        }
    }

    pub fn signature(&self) -> OpSignature {
        use OpCode::*;
        let (inputs, outputs): (&'static [InputDecl], &'static [OutputDecl]) = match self {
            AddFloat | SubFloat | MulFloat | DivFloat | Power | Logarithm | Minimum | Maximum
            | LessThan | GreaterThan | Modulo => (IN_FLOAT_2, OUT_FLOAT),
            Sine | Cosine | Tangent | Arcsine | Arccosine | Arctangent | Round | Absolute
            | Clamp => (IN_FLOAT_1, OUT_FLOAT),
            AddFloat3 | SubFloat3 | AverageFloat3 | CrossFloat3 => (IN_FLOAT3_2, OUT_FLOAT3),
            DotFloat3 => (IN_FLOAT3_2, OUT_FLOAT),
            NormalizeFloat3 => (IN_FLOAT3_1, NORMALIZE_OUT),
            GetElemFloat3 => (GET_ELEM_IN, OUT_FLOAT),
            SetFloat3 => (SET_FLOAT3_IN, OUT_FLOAT3),
            LocToMatrix44 => (LOC_IN, OUT_MATRIX),
            EulerToMatrix44 => (EULER_IN, OUT_MATRIX),
            AxisangleToMatrix44 => (AXISANGLE_IN, OUT_MATRIX),
            ScaleToMatrix44 => (SCALE_IN, OUT_MATRIX),
            MulMatrix44 => (MUL_MATRIX_IN, OUT_MATRIX),
            Matrix44ToLoc => (IN_MATRIX, LOC_OUT),
            Matrix44ToEuler => (TO_EULER_IN, EULER_OUT),
            Matrix44ToAxisangle => (IN_MATRIX, AXISANGLE_OUT),
            Matrix44ToScale => (IN_MATRIX, SCALE_OUT),
            ArgFloat => (IN_NONE, OUT_FLOAT),
            ArgInt => (IN_NONE, OUT_INT),
            ArgFloat3 => (IN_NONE, OUT_FLOAT3),
            ArgMatrix44 => (IN_NONE, OUT_MATRIX_VALUE),
        };
        OpSignature { inputs, outputs }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for op in OpCode::ALL {
            let json = serde_json::to_string(op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.name()));
        }
    }

    #[test]
    fn test_from_name_roundtrip() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_name(op.name()), Some(*op));
        }
        assert_eq!(OpCode::from_name("NOT_AN_OP"), None);
    }

    #[test]
    fn test_slot_names_are_unique_per_signature() {
        for op in OpCode::ALL {
            let sig = op.signature();
            let mut seen = std::collections::HashSet::new();
            for d in sig.inputs {
                assert!(seen.insert(d.name), "{} repeats input {}", op, d.name);
            }
            seen.clear();
            for d in sig.outputs {
                assert!(seen.insert(d.name), "{} repeats output {}", op, d.name);
            }
        }
    }

    #[test]
    fn test_elem_extraction_signature() {
        let sig = OpCode::GetElemFloat3.signature();
        assert_eq!(sig.input_index("index"), Some(0));
        assert_eq!(sig.input_index("value"), Some(1));
        assert_eq!(sig.inputs[0].value_type(), ValueType::Int);
        assert_eq!(sig.outputs[0].value_type, ValueType::Float);
    }
}
