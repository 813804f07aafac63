//! MAVLink v2 framing, schema-driven decoding and command encoding.
//!
//! mavwire turns a byte stream from a vehicle link into typed, named messages
//! and turns command documents into checksummed frames, driven entirely by a
//! runtime message registry.
//!
//! # Crate Structure
//!
//! - [`frame`]: Wire constants, X.25 checksum and the resynchronizing frame assembler
//! - [`schema`]: Message schemas, `crc_extra` derivation and the dialect registry
//! - [`codec`]: Frame decoder, command encoder, sessions and decode-error reporting
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mavwire::codec::{Session, SessionConfig};
//! use mavwire::schema::SchemaRegistry;
//!
//! let registry = Arc::new(SchemaRegistry::common()?);
//! let mut session = Session::new(registry, SessionConfig::default());
//!
//! let wire = session.encode_json(r#"{"MSGNAME": "HEARTBEAT", "type": 6}"#)?;
//! for outcome in session.feed(&wire) {
//!     println!("{:?}", outcome?.to_record());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Re-export frame types.
pub mod frame {
    pub use mavwire_frame::*;
}

/// Re-export schema types.
pub mod schema {
    pub use mavwire_schema::*;
}

/// Re-export codec types.
pub mod codec {
    pub use mavwire_codec::*;
}
