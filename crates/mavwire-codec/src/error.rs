use bytes::Bytes;
use mavwire_frame::FrameError;

/// Why a candidate frame did not decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    /// The bytes are not a well-formed frame.
    #[error("framing error: {0}")]
    Framing(&'static str),

    /// The transmitted checksum does not match the frame contents.
    #[error("checksum mismatch (computed {computed:#06x}, received {received:#06x})")]
    Checksum { computed: u16, received: u16 },

    /// The registry has no schema for this message id.
    #[error("unknown message id {0}")]
    UnknownMessageId(u32),

    /// Well-formed, but sent by a system this receiver does not listen to.
    #[error("frame filtered out")]
    FilteredOut,
}

/// A failed decode, with whatever identity could be recovered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// The candidate frame exactly as received.
    pub raw: Bytes,
    /// Source system id, 0 if the frame is too short to carry one.
    pub source_system: u8,
    /// Source component id, 0 if the frame is too short to carry one.
    pub source_component: u8,
    /// Microseconds since the Unix epoch.
    pub timestamp_us: u64,
}

impl DecodeError {
    /// True for frames dropped by the target filter rather than rejected.
    pub fn is_filtered(&self) -> bool {
        self.kind == DecodeErrorKind::FilteredOut
    }
}

/// Errors that can occur while encoding a command.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// No schema for the requested message name.
    #[error("unknown message type: {0}")]
    UnknownMessage(String),

    /// The command document has no message name.
    #[error("command has no MSGNAME")]
    MissingMessageName,

    /// The command document is not a JSON object.
    #[error("command must be a JSON object")]
    NotAnObject,

    /// The command document is not valid JSON.
    #[error("command is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value has the wrong JSON type.
    #[error("field {field}: expected {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },

    /// A numeric value does not fit the field's wire type.
    #[error("field {field}: value out of range for {field_type}")]
    OutOfRange { field: String, field_type: String },

    /// A string or array is longer than the field.
    #[error("field {field}: length {len} exceeds {max}")]
    TooLong {
        field: String,
        len: usize,
        max: usize,
    },

    /// The assembled frame was rejected by the wire layer.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

/// A sink could not accept a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// Errors that can occur while loading session configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EncodeError>;
