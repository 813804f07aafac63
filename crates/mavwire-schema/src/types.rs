//! MAVLink wire types.

use std::fmt;
use std::str::FromStr;

/// Scalar element type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
}

impl ScalarType {
    /// Encoded width of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Char | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
        }
    }

    /// Name as written in dialect definitions and hashed into `crc_extra`.
    pub fn c_name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Int8 => "int8_t",
            Self::UInt8 => "uint8_t",
            Self::Int16 => "int16_t",
            Self::UInt16 => "uint16_t",
            Self::Int32 => "int32_t",
            Self::UInt32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::UInt64 => "uint64_t",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub fn from_c_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "char" => Self::Char,
            "int8_t" => Self::Int8,
            "uint8_t" => Self::UInt8,
            // HEARTBEAT.mavlink_version is a plain uint8_t on the wire.
            "uint8_t_mavlink_version" => Self::UInt8,
            "int16_t" => Self::Int16,
            "uint16_t" => Self::UInt16,
            "int32_t" => Self::Int32,
            "uint32_t" => Self::UInt32,
            "int64_t" => Self::Int64,
            "uint64_t" => Self::UInt64,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        };
        Some(scalar)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

/// Full type of a field: a scalar, optionally a fixed-length array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub scalar: ScalarType,
    pub array_len: Option<u8>,
}

impl FieldType {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self {
            scalar,
            array_len: None,
        }
    }

    pub fn array(scalar: ScalarType, len: u8) -> Self {
        Self {
            scalar,
            array_len: Some(len),
        }
    }

    /// Number of scalar elements.
    pub fn len(&self) -> usize {
        self.array_len.map_or(1, usize::from)
    }

    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        self.scalar.size() * self.len()
    }

    /// Character fields carry text rather than numbers.
    pub fn is_text(&self) -> bool {
        self.scalar == ScalarType::Char
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_len {
            Some(len) => write!(f, "{}[{len}]", self.scalar.c_name()),
            None => f.write_str(self.scalar.c_name()),
        }
    }
}

/// Error for a type string that is not a MAVLink wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType;

impl FromStr for FieldType {
    type Err = UnknownType;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let Some(open) = input.find('[') else {
            return ScalarType::from_c_name(input)
                .map(Self::scalar)
                .ok_or(UnknownType);
        };

        let inner = input[open + 1..].strip_suffix(']').ok_or(UnknownType)?;
        let len: u8 = inner.trim().parse().map_err(|_| UnknownType)?;
        if len == 0 {
            return Err(UnknownType);
        }
        let scalar = ScalarType::from_c_name(input[..open].trim()).ok_or(UnknownType)?;
        Ok(Self::array(scalar, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_arrays() {
        assert_eq!(
            "uint16_t".parse::<FieldType>(),
            Ok(FieldType::scalar(ScalarType::UInt16))
        );
        assert_eq!(
            "float[4]".parse::<FieldType>(),
            Ok(FieldType::array(ScalarType::Float, 4))
        );
        assert_eq!(
            "char[50]".parse::<FieldType>(),
            Ok(FieldType::array(ScalarType::Char, 50))
        );
    }

    #[test]
    fn mavlink_version_alias_is_uint8() {
        assert_eq!(
            "uint8_t_mavlink_version".parse::<FieldType>(),
            Ok(FieldType::scalar(ScalarType::UInt8))
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_types() {
        assert_eq!("uint128_t".parse::<FieldType>(), Err(UnknownType));
        assert_eq!("float[".parse::<FieldType>(), Err(UnknownType));
        assert_eq!("float[0]".parse::<FieldType>(), Err(UnknownType));
        assert_eq!("float[300]".parse::<FieldType>(), Err(UnknownType));
    }

    #[test]
    fn widths() {
        assert_eq!(FieldType::scalar(ScalarType::Double).width(), 8);
        assert_eq!(FieldType::array(ScalarType::UInt16, 18).width(), 36);
        assert_eq!(FieldType::array(ScalarType::Char, 16).width(), 16);
    }

    #[test]
    fn display_roundtrips() {
        for text in ["int8_t", "uint64_t", "double", "char[16]", "int32_t[3]"] {
            let parsed: FieldType = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }
}
