//! X.25 (CRC-16/MCRF4XX) running checksum.

/// Initial accumulator value.
pub const X25_INIT: u16 = 0xFFFF;

/// Incremental X.25 checksum as used by the MAVLink wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X25 {
    crc: u16,
}

impl X25 {
    pub fn new() -> Self {
        Self { crc: X25_INIT }
    }

    /// Accumulate a single byte.
    pub fn update_byte(&mut self, byte: u8) {
        let tmp = byte ^ (self.crc & 0xFF) as u8;
        let tmp = tmp ^ (tmp << 4);
        let tmp = u16::from(tmp);
        self.crc = (self.crc >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4);
    }

    /// Accumulate a byte slice.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update_byte(byte);
        }
    }

    pub fn finish(self) -> u16 {
        self.crc
    }
}

impl Default for X25 {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum of a frame, given the frame bytes up to (not including) the
/// checksum field.
///
/// The sync byte is excluded and the message's `crc_extra` seed is folded in
/// after the payload, so frames built against a different dialect revision
/// never validate.
pub fn frame_checksum(frame_without_checksum: &[u8], crc_extra: u8) -> u16 {
    let mut crc = X25::new();
    crc.update(frame_without_checksum.get(1..).unwrap_or_default());
    crc.update_byte(crc_extra);
    crc.finish()
}
