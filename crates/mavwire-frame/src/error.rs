/// Errors that can occur while building a frame for the wire.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The payload does not fit the single-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The message id does not fit the 24-bit id field.
    #[error("message id {0} exceeds the 24-bit id range")]
    MessageIdOutOfRange(u32),

    /// The header's declared payload length disagrees with the payload.
    #[error("header declares {declared} payload bytes but {actual} were supplied")]
    LengthMismatch { declared: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
