//! Schema-driven MAVLink v2 decoding, command encoding and decode-error
//! reporting.
//!
//! A [`Session`] is the per-connection unit: it owns the assembly buffer and
//! the outbound sequence counter, and shares a read-only
//! [`SchemaRegistry`](mavwire_schema::SchemaRegistry) with other sessions.
//!
//! ```text
//! bytes ─▶ FrameAssembler ─▶ FrameDecoder ─▶ DecodedMessage ─▶ MessageSink
//!                                  │
//!                                  └──────▶ DecodeError ─▶ ErrorReporter ─▶ ErrorSink
//!
//! command ─▶ CommandEncoder ─▶ wire bytes
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reporter;
pub mod session;
pub mod value;

pub use config::{DecoderConfig, EncoderConfig, SessionConfig};
pub use decoder::{DecodedMessage, FrameDecoder};
pub use encoder::{CommandEncoder, MSGNAME_KEY};
pub use error::{ConfigError, DecodeError, DecodeErrorKind, EncodeError, SinkError};
pub use reporter::{
    DiagnosticRecord, ErrorKindTag, ErrorReporter, ErrorSink, JsonLinesSink, DECODE_ERROR_ID,
    DECODE_ERROR_NAME,
};
pub use session::{Decoded, MessageSink, PumpStats, Session};
pub use value::FieldValue;
