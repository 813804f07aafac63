/// Errors that can occur while building a schema registry.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The dialect file could not be loaded.
    #[error("failed to load dialect: {0}")]
    LoadFailed(String),

    /// The dialect definition is not valid JSON for the expected shape.
    #[error("dialect is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A message has no name.
    #[error("message {0} has an empty name")]
    EmptyName(u32),

    /// Message id does not fit the 24-bit wire field.
    #[error("message {name}: id {id} exceeds the 24-bit id range")]
    IdOutOfRange { name: String, id: u32 },

    /// Two messages share an id.
    #[error("message id {id} registered twice ({existing} and {name})")]
    DuplicateId {
        id: u32,
        existing: String,
        name: String,
    },

    /// Two messages share a name.
    #[error("message name {0} registered twice")]
    DuplicateName(String),

    /// A field's type string is not a MAVLink wire type.
    #[error("message {message}: field {field} has unknown type {type_name:?}")]
    UnknownFieldType {
        message: String,
        field: String,
        type_name: String,
    },

    /// A field has no name or repeats another field's name.
    #[error("message {message}: invalid or duplicate field name {field:?}")]
    InvalidFieldName { message: String, field: String },

    /// The sum of field widths exceeds the single-byte length field.
    #[error("message {message}: payload is {size} bytes, max 255")]
    PayloadTooLarge { message: String, size: usize },

    /// The definition states a checksum seed that disagrees with its layout.
    #[error("message {message}: stated crc_extra {stated} but layout yields {computed}")]
    CrcExtraMismatch {
        message: String,
        stated: u8,
        computed: u8,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
