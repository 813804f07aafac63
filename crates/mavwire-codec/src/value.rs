//! Typed field values and their little-endian wire forms.

use mavwire_schema::{FieldDef, FieldType, ScalarType};
use serde::Serialize;
use serde_json::Value;

use crate::error::{EncodeError, Result};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Typed zero for a field, the value of everything past a truncation point.
    pub fn zero(field_type: FieldType) -> Self {
        if field_type.is_text() {
            return Self::Text(String::new());
        }
        let element = zero_scalar(field_type.scalar);
        match field_type.array_len {
            Some(len) => Self::Array(vec![element; usize::from(len)]),
            None => element,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::UInt(v) => Some(v),
            Self::Int(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// JSON form. Non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => Value::from(*v),
            Self::UInt(v) => Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Self::Text(text) => Value::String(text.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

fn zero_scalar(scalar: ScalarType) -> FieldValue {
    if scalar.is_float() {
        FieldValue::Float(0.0)
    } else if scalar.is_signed() {
        FieldValue::Int(0)
    } else {
        FieldValue::UInt(0)
    }
}

/// Read one field out of an untruncated payload.
///
/// `payload` must be at least `field.offset() + field.width()` bytes.
pub(crate) fn read_field(field: &FieldDef, payload: &[u8]) -> FieldValue {
    let bytes = &payload[field.offset()..field.offset() + field.width()];
    let field_type = field.field_type();

    if field_type.is_text() {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        return FieldValue::Text(String::from_utf8_lossy(&bytes[..end]).into_owned());
    }

    let size = field_type.scalar.size();
    match field_type.array_len {
        Some(_) => FieldValue::Array(
            bytes
                .chunks_exact(size)
                .map(|chunk| read_scalar(field_type.scalar, chunk))
                .collect(),
        ),
        None => read_scalar(field_type.scalar, bytes),
    }
}

fn read_scalar(scalar: ScalarType, b: &[u8]) -> FieldValue {
    match scalar {
        ScalarType::Char | ScalarType::UInt8 => FieldValue::UInt(u64::from(b[0])),
        ScalarType::Int8 => FieldValue::Int(i64::from(b[0] as i8)),
        ScalarType::UInt16 => FieldValue::UInt(u64::from(u16::from_le_bytes([b[0], b[1]]))),
        ScalarType::Int16 => FieldValue::Int(i64::from(i16::from_le_bytes([b[0], b[1]]))),
        ScalarType::UInt32 => {
            FieldValue::UInt(u64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]])))
        }
        ScalarType::Int32 => {
            FieldValue::Int(i64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])))
        }
        ScalarType::Float => {
            FieldValue::Float(f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
        }
        ScalarType::UInt64 => FieldValue::UInt(u64::from_le_bytes(eight(b))),
        ScalarType::Int64 => FieldValue::Int(i64::from_le_bytes(eight(b))),
        ScalarType::Double => FieldValue::Float(f64::from_le_bytes(eight(b))),
    }
}

fn eight(b: &[u8]) -> [u8; 8] {
    [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

/// Serialize one field into its slot of a zeroed, untruncated payload.
///
/// A missing or `null` value leaves the slot zero.
pub(crate) fn write_field(
    field: &FieldDef,
    value: Option<&Value>,
    payload: &mut [u8],
) -> Result<()> {
    let value = match value {
        None | Some(Value::Null) => return Ok(()),
        Some(value) => value,
    };
    let slot = &mut payload[field.offset()..field.offset() + field.width()];
    let field_type = field.field_type();

    if field_type.is_text() {
        let Value::String(text) = value else {
            return Err(invalid(field, "a string"));
        };
        let bytes = text.as_bytes();
        if bytes.len() > slot.len() {
            return Err(EncodeError::TooLong {
                field: field.name().to_string(),
                len: bytes.len(),
                max: slot.len(),
            });
        }
        slot[..bytes.len()].copy_from_slice(bytes);
        return Ok(());
    }

    let size = field_type.scalar.size();
    match field_type.array_len {
        None => write_scalar(field, field_type.scalar, value, slot),
        Some(len) => {
            let Value::Array(items) = value else {
                return Err(invalid(field, "an array"));
            };
            if items.len() > usize::from(len) {
                return Err(EncodeError::TooLong {
                    field: field.name().to_string(),
                    len: items.len(),
                    max: usize::from(len),
                });
            }
            for (item, chunk) in items.iter().zip(slot.chunks_exact_mut(size)) {
                if !item.is_null() {
                    write_scalar(field, field_type.scalar, item, chunk)?;
                }
            }
            Ok(())
        }
    }
}

fn write_scalar(field: &FieldDef, scalar: ScalarType, value: &Value, out: &mut [u8]) -> Result<()> {
    match scalar {
        ScalarType::Float => {
            let v = number(field, value)? as f32;
            out.copy_from_slice(&v.to_le_bytes());
        }
        ScalarType::Double => {
            let v = number(field, value)?;
            out.copy_from_slice(&v.to_le_bytes());
        }
        _ => {
            let v = integer(field, value)?;
            let (min, max) = integer_bounds(scalar);
            if v < min || v > max {
                return Err(EncodeError::OutOfRange {
                    field: field.name().to_string(),
                    field_type: field.field_type().to_string(),
                });
            }
            // In range, so the low `size` bytes of the two's complement form
            // are exactly the wire encoding.
            out.copy_from_slice(&v.to_le_bytes()[..out.len()]);
        }
    }
    Ok(())
}

fn integer_bounds(scalar: ScalarType) -> (i128, i128) {
    match scalar {
        ScalarType::Char | ScalarType::UInt8 => (0, i128::from(u8::MAX)),
        ScalarType::Int8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
        ScalarType::UInt16 => (0, i128::from(u16::MAX)),
        ScalarType::Int16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
        ScalarType::UInt32 => (0, i128::from(u32::MAX)),
        ScalarType::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
        ScalarType::UInt64 => (0, i128::from(u64::MAX)),
        ScalarType::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
        ScalarType::Float | ScalarType::Double => (i128::MIN, i128::MAX),
    }
}

fn integer(field: &FieldDef, value: &Value) -> Result<i128> {
    match value {
        Value::Bool(flag) => Ok(i128::from(*flag)),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(i128::from(v));
            }
            if let Some(v) = n.as_u64() {
                return Ok(i128::from(v));
            }
            match n.as_f64() {
                Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i128),
                _ => Err(invalid(field, "an integer")),
            }
        }
        _ => Err(invalid(field, "an integer")),
    }
}

fn number(field: &FieldDef, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(field, "a number")),
        _ => Err(invalid(field, "a number")),
    }
}

fn invalid(field: &FieldDef, expected: &'static str) -> EncodeError {
    EncodeError::InvalidValue {
        field: field.name().to_string(),
        expected,
    }
}
