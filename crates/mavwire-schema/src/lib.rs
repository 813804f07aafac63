//! MAVLink dialect definitions and the message schema registry.
//!
//! A dialect is versioned data: message ids, field layouts and checksum
//! seeds must match bit-for-bit on both ends of a link. This crate parses a
//! JSON dialect definition, derives each message's wire layout and
//! `crc_extra`, and serves read-only lookups by id and by name.
//!
//! The `common` dialect subset ships embedded; see
//! [`SchemaRegistry::common`].

pub mod config;
pub mod dialect;
pub mod error;
pub mod registry;
pub mod types;

pub use config::RegistryConfig;
pub use dialect::{compute_crc_extra, DialectDefinition, FieldDefinition, MessageDefinition};
pub use error::{Result, SchemaError};
pub use registry::{FieldDef, SchemaEntry, SchemaRegistry};
pub use types::{FieldType, ScalarType};
