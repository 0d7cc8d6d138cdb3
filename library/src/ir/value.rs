//! Literal values and value types carried by IR slots.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Type of an IR slot.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Float,
    Int,
    Float3,
    Matrix44,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Float => "float",
            ValueType::Int => "int",
            ValueType::Float3 => "float3",
            ValueType::Matrix44 => "matrix44",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal constant stored in an unconnected IR input slot.
///
/// Floats are wrapped in `OrderedFloat` so whole IR graphs can be compared
/// and hashed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Float(OrderedFloat<f32>),
    Int(i32),
    Float3([OrderedFloat<f32>; 3]),
    Matrix44([[OrderedFloat<f32>; 4]; 4]),
}

const O: OrderedFloat<f32> = OrderedFloat(0.0);
const I: OrderedFloat<f32> = OrderedFloat(1.0);

impl Value {
    pub const IDENTITY: Value = Value::Matrix44([
        [I, O, O, O],
        [O, I, O, O],
        [O, O, I, O],
        [O, O, O, I],
    ]);

    pub const fn float(v: f32) -> Self {
        Value::Float(OrderedFloat(v))
    }

    pub const fn int(v: i32) -> Self {
        Value::Int(v)
    }

    pub const fn float3(x: f32, y: f32, z: f32) -> Self {
        Value::Float3([OrderedFloat(x), OrderedFloat(y), OrderedFloat(z)])
    }

    pub const fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_) => ValueType::Float,
            Value::Int(_) => ValueType::Int,
            Value::Float3(_) => ValueType::Float3,
            Value::Matrix44(_) => ValueType::Matrix44,
        }
    }

    /// Convert to the given slot type. Only int and float convert into each
    /// other; everything else must already match.
    pub fn convert_to(self, target: ValueType) -> Option<Value> {
        match (self, target) {
            (v, t) if v.value_type() == t => Some(v),
            (Value::Int(i), ValueType::Float) => Some(Value::float(i as f32)),
            (Value::Float(f), ValueType::Int) => Some(Value::Int(f.into_inner() as i32)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float3([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            Value::Matrix44(_) if *self == Value::IDENTITY => f.write_str("<identity>"),
            Value::Matrix44(rows) => {
                f.write_str("[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {} {} {}", row[0], row[1], row[2], row[3])?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_float_conversion() {
        assert_eq!(Value::int(2).convert_to(ValueType::Float), Some(Value::float(2.0)));
        assert_eq!(Value::float(3.7).convert_to(ValueType::Int), Some(Value::int(3)));
    }

    #[test]
    fn test_mismatched_types_do_not_convert() {
        assert_eq!(Value::float(1.0).convert_to(ValueType::Float3), None);
        assert_eq!(Value::IDENTITY.convert_to(ValueType::Float), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::float3(1.0, 2.0, 0.5).to_string(), "(1, 2, 0.5)");
        assert_eq!(Value::IDENTITY.to_string(), "<identity>");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Value::int(4)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":4}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::int(4));
    }
}
