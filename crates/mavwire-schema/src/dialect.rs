//! Dialect definition format.
//!
//! ```json
//! {
//!   "dialect": "common",
//!   "version": 3,
//!   "messages": [
//!     {
//!       "id": 4,
//!       "name": "PING",
//!       "crc_extra": 237,
//!       "fields": [
//!         { "name": "time_usec", "type": "uint64_t" },
//!         { "name": "seq", "type": "uint32_t" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Fields are listed in declaration order; the registry derives wire order.

use mavwire_frame::X25;
use serde::{Deserialize, Serialize};

use crate::registry::FieldDef;

/// A whole dialect file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectDefinition {
    pub dialect: String,
    #[serde(default)]
    pub version: u32,
    pub messages: Vec<MessageDefinition>,
}

/// One message as declared in a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDefinition {
    pub id: u32,
    pub name: String,
    /// Checksum seed. Derived from the layout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc_extra: Option<u8>,
    pub fields: Vec<FieldDefinition>,
}

impl MessageDefinition {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            crc_extra: None,
            fields: Vec::new(),
        }
    }

    /// Append a base field.
    pub fn field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(FieldDefinition {
            name: name.into(),
            type_name: type_name.into(),
            extension: false,
        });
        self
    }

    /// Append an extension field.
    pub fn extension(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(FieldDefinition {
            name: name.into(),
            type_name: type_name.into(),
            extension: true,
        });
        self
    }

    pub fn with_crc_extra(mut self, crc_extra: u8) -> Self {
        self.crc_extra = Some(crc_extra);
        self
    }
}

/// One field as declared in a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Extension fields are appended after the base layout and are not
    /// part of the checksum seed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub extension: bool,
}

/// Derive a message's checksum seed from its wire-ordered fields.
///
/// Hashes `"NAME "`, then `"type "`, `"name "` and (for arrays) the length
/// byte of every base field, and folds the 16-bit result to one byte.
pub fn compute_crc_extra(name: &str, fields: &[FieldDef]) -> u8 {
    let mut crc = X25::new();
    crc.update(name.as_bytes());
    crc.update_byte(b' ');
    for field in fields.iter().filter(|field| !field.is_extension()) {
        crc.update(field.field_type().scalar.c_name().as_bytes());
        crc.update_byte(b' ');
        crc.update(field.name().as_bytes());
        crc.update_byte(b' ');
        if let Some(len) = field.field_type().array_len {
            crc.update_byte(len);
        }
    }
    let crc = crc.finish();
    ((crc & 0xFF) ^ (crc >> 8)) as u8
}
