use std::fmt;
use std::io;

use mavwire_codec::{ConfigError, EncodeError};
use mavwire_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    match err {
        SchemaError::LoadFailed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    match err {
        ConfigError::Io(source) => io_error(context, source),
        ConfigError::InvalidJson(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn encode_error(context: &str, err: EncodeError) -> CliError {
    match err {
        EncodeError::Frame(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_by_kind() {
        let missing = io_error("open", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(missing.code, FAILURE);
        assert!(missing.message.starts_with("open: "));

        let bad = io_error("read", io::Error::from(io::ErrorKind::InvalidData));
        assert_eq!(bad.code, DATA_INVALID);

        let other = io_error("write", io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(other.code, INTERNAL);
    }

    #[test]
    fn encode_errors_are_data_errors() {
        let err = encode_error(
            "encode failed",
            EncodeError::UnknownMessage("NOPE".to_string()),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.to_string(), "encode failed: unknown message type: NOPE");
    }

    #[test]
    fn unreadable_dialect_is_a_failure() {
        let err = schema_error("dialect", SchemaError::LoadFailed("gone".to_string()));
        assert_eq!(err.code, FAILURE);
        let err = schema_error("dialect", SchemaError::DuplicateName("PING".to_string()));
        assert_eq!(err.code, DATA_INVALID);
    }
}
