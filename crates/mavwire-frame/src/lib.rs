//! MAVLink v2 frame layout, checksum and stream resynchronization.
//!
//! This is the lowest layer of mavwire. Every frame on the wire is:
//! - A sync byte (`0xFD`) for stream resynchronization
//! - A 9-byte header: payload length, flags, sequence, source identity and
//!   a 24-bit little-endian message id
//! - A payload of 0-255 bytes, possibly truncated of trailing zeros
//! - A 2-byte X.25 checksum seeded with a per-message `crc_extra`
//!
//! [`FrameAssembler`] turns an arbitrary byte stream into candidate
//! [`RawFrame`]s. Interpreting a frame needs a schema and lives in
//! `mavwire-codec`.

pub mod assembler;
pub mod checksum;
pub mod codec;
pub mod error;

pub use assembler::{FrameAssembler, Frames};
pub use checksum::{frame_checksum, X25};
pub use codec::{
    encode_frame, Header, RawFrame, CHECKSUM_LEN, HEADER_LEN, MAX_MESSAGE_ID, MAX_PAYLOAD_LEN,
    MIN_FRAME_LEN, STX,
};
pub use error::{FrameError, Result};
