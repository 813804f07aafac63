use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::frame_checksum;
use crate::error::{FrameError, Result};

/// Sync byte marking the start of every MAVLink v2 frame.
pub const STX: u8 = 0xFD;

/// Frame header: sync (1) + len (1) + flags (2) + seq (1) + ids (2) + msgid (3).
pub const HEADER_LEN: usize = 10;

/// Trailing X.25 checksum.
pub const CHECKSUM_LEN: usize = 2;

/// The payload length is a single byte.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Message ids occupy three header bytes.
pub const MAX_MESSAGE_ID: u32 = 0x00FF_FFFF;

/// Smallest well-formed frame: header and checksum around an empty payload.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + CHECKSUM_LEN;

/// The fixed-position fields of a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Payload bytes that follow the header, as transmitted.
    pub payload_len: u8,
    pub incompat_flags: u8,
    pub compat_flags: u8,
    /// Per-sender wrapping sequence number.
    pub sequence: u8,
    pub source_system: u8,
    pub source_component: u8,
    /// 24-bit message id.
    pub message_id: u32,
}

impl Header {
    /// Parse a header from the start of `bytes`.
    ///
    /// Returns `None` if fewer than [`HEADER_LEN`] bytes are present or the
    /// first byte is not [`STX`].
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN || bytes[0] != STX {
            return None;
        }
        Some(Self {
            payload_len: bytes[1],
            incompat_flags: bytes[2],
            compat_flags: bytes[3],
            sequence: bytes[4],
            source_system: bytes[5],
            source_component: bytes[6],
            message_id: message_id_from_bytes([bytes[7], bytes[8], bytes[9]]),
        })
    }

    /// The number of wire bytes of the frame this header introduces.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + usize::from(self.payload_len) + CHECKSUM_LEN
    }

    fn put(&self, dst: &mut BytesMut) -> Result<()> {
        if self.message_id > MAX_MESSAGE_ID {
            return Err(FrameError::MessageIdOutOfRange(self.message_id));
        }
        let id = self.message_id.to_le_bytes();
        dst.put_u8(STX);
        dst.put_u8(self.payload_len);
        dst.put_u8(self.incompat_flags);
        dst.put_u8(self.compat_flags);
        dst.put_u8(self.sequence);
        dst.put_u8(self.source_system);
        dst.put_u8(self.source_component);
        dst.put_slice(&id[..3]);
        Ok(())
    }
}

fn message_id_from_bytes(bytes: [u8; 3]) -> u32 {
    u32::from(bytes[0]) | (u32::from(bytes[1]) << 8) | (u32::from(bytes[2]) << 16)
}

/// One candidate frame sliced off the stream.
///
/// A `RawFrame` is only a byte span: nothing about it has been validated
/// beyond what the assembler needs to find its end. Accessors are
/// best-effort and return `None` when the bytes are too short to hold the
/// requested field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Bytes,
}

impl RawFrame {
    /// Wrap arbitrary bytes as a candidate frame.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn header(&self) -> Option<Header> {
        Header::parse(&self.bytes)
    }

    /// True if the bytes start with a header and span exactly the length
    /// that header declares.
    pub fn is_complete(&self) -> bool {
        self.header()
            .is_some_and(|header| header.frame_len() == self.bytes.len())
    }

    /// Declared (possibly truncated) payload bytes.
    pub fn payload(&self) -> Option<&[u8]> {
        let header = self.header()?;
        self.bytes.get(HEADER_LEN..HEADER_LEN + usize::from(header.payload_len))
    }

    /// Header and payload, the span covered by the checksum.
    pub fn checked_span(&self) -> Option<&[u8]> {
        let header = self.header()?;
        self.bytes.get(..HEADER_LEN + usize::from(header.payload_len))
    }

    /// Transmitted checksum (little-endian).
    pub fn checksum(&self) -> Option<u16> {
        let header = self.header()?;
        let start = HEADER_LEN + usize::from(header.payload_len);
        let bytes = self.bytes.get(start..start + CHECKSUM_LEN)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn source_system(&self) -> Option<u8> {
        self.bytes.get(5).copied()
    }

    pub fn source_component(&self) -> Option<u8> {
        self.bytes.get(6).copied()
    }

    pub fn message_id(&self) -> Option<u32> {
        let bytes = self.bytes.get(7..HEADER_LEN)?;
        Some(message_id_from_bytes([bytes[0], bytes[1], bytes[2]]))
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬─────┬────────┬────────┬─────┬───────┬───────┬───────────┬─────────┬──────────┐
/// │ STX  │ LEN │ INCOMP │ COMPAT │ SEQ │ SYSID │ COMPID│ MSGID     │ PAYLOAD │ CHECKSUM │
/// │ 0xFD │ 1B  │ 1B     │ 1B     │ 1B  │ 1B    │ 1B    │ (3B LE)   │ LEN B   │ (2B LE)  │
/// └──────┴─────┴────────┴────────┴─────┴───────┴───────┴───────────┴─────────┴──────────┘
/// ```
///
/// `header.payload_len` must equal `payload.len()`.
pub fn encode_frame(
    header: &Header,
    payload: &[u8],
    crc_extra: u8,
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    if usize::from(header.payload_len) != payload.len() {
        return Err(FrameError::LengthMismatch {
            declared: usize::from(header.payload_len),
            actual: payload.len(),
        });
    }

    let start = dst.len();
    dst.reserve(header.frame_len());
    header.put(dst)?;
    dst.put_slice(payload);
    let crc = frame_checksum(&dst[start..], crc_extra);
    dst.put_u16_le(crc);
    Ok(())
}
