//! Decode-error diagnostics.
//!
//! Every reportable [`DecodeError`] becomes a [`DiagnosticRecord`], a flat
//! telemetry packet with a reserved id, and is pushed to an [`ErrorSink`].
//! Sink failures are logged and swallowed so a broken diagnostic channel
//! never stalls the decode loop.

use std::io::Write;

use serde::Serialize;

use crate::error::{DecodeError, DecodeErrorKind, SinkError};

/// Reserved message id of diagnostic records.
pub const DECODE_ERROR_ID: u32 = 65535;

/// Name of diagnostic records, and the default diagnostic channel.
pub const DECODE_ERROR_NAME: &str = "DECODE_ERROR";

/// Error classification carried by a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKindTag {
    FramingError,
    ChecksumFailure,
    UnknownMessage,
}

impl ErrorKindTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FramingError => "FRAMING_ERROR",
            Self::ChecksumFailure => "CHECKSUM_FAILURE",
            Self::UnknownMessage => "UNKNOWN_MESSAGE",
        }
    }

    /// Tag for a decode failure; `None` for frames that were only filtered.
    pub fn classify(kind: &DecodeErrorKind) -> Option<Self> {
        match kind {
            DecodeErrorKind::Framing(_) => Some(Self::FramingError),
            DecodeErrorKind::Checksum { .. } => Some(Self::ChecksumFailure),
            DecodeErrorKind::UnknownMessageId(_) => Some(Self::UnknownMessage),
            DecodeErrorKind::FilteredOut => None,
        }
    }
}

/// Diagnostic packet describing one rejected frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DiagnosticRecord {
    #[serde(rename = "MSGID")]
    pub id: u32,
    #[serde(rename = "MSGNAME")]
    pub name: &'static str,
    #[serde(rename = "SYSID")]
    pub source_system: u8,
    #[serde(rename = "COMPID")]
    pub source_component: u8,
    pub timestamp_us: u64,
    #[serde(rename = "ERROR_TYPE")]
    pub kind: ErrorKindTag,
    #[serde(rename = "ERROR_MESSAGE")]
    pub message: String,
    pub frame_length: usize,
    /// Raw frame bytes, lowercase hex.
    #[serde(rename = "RAW_DATA")]
    pub raw_hex: String,
}

impl DiagnosticRecord {
    /// Build the record for `err`; `None` if the error is not reportable.
    pub fn from_error(err: &DecodeError) -> Option<Self> {
        let kind = ErrorKindTag::classify(&err.kind)?;
        Some(Self {
            id: DECODE_ERROR_ID,
            name: DECODE_ERROR_NAME,
            source_system: err.source_system,
            source_component: err.source_component,
            timestamp_us: err.timestamp_us,
            kind,
            message: err.kind.to_string(),
            frame_length: err.raw.len(),
            raw_hex: hex::encode(&err.raw),
        })
    }

    /// Recover the original frame bytes.
    pub fn raw_bytes(&self) -> Option<Vec<u8>> {
        hex::decode(&self.raw_hex).ok()
    }
}

/// Destination for diagnostic records.
pub trait ErrorSink {
    fn push(&mut self, channel: &str, record: &DiagnosticRecord) -> Result<(), SinkError>;
}

impl ErrorSink for Vec<DiagnosticRecord> {
    fn push(&mut self, _channel: &str, record: &DiagnosticRecord) -> Result<(), SinkError> {
        Vec::push(self, record.clone());
        Ok(())
    }
}

impl<T: ErrorSink + ?Sized> ErrorSink for &mut T {
    fn push(&mut self, channel: &str, record: &DiagnosticRecord) -> Result<(), SinkError> {
        (**self).push(channel, record)
    }
}

/// Writes each record as one JSON line tagged with its channel.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    inner: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[derive(Serialize)]
struct ChannelLine<'a> {
    channel: &'a str,
    #[serde(flatten)]
    record: &'a DiagnosticRecord,
}

impl<W: Write> ErrorSink for JsonLinesSink<W> {
    fn push(&mut self, channel: &str, record: &DiagnosticRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.inner, &ChannelLine { channel, record })?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(())
    }
}

/// Formats decode errors and hands them to a sink.
#[derive(Debug)]
pub struct ErrorReporter<S> {
    sink: S,
    channel: String,
    reported: u64,
    push_failures: u64,
}

impl<S: ErrorSink> ErrorReporter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_channel(sink, DECODE_ERROR_NAME)
    }

    pub fn with_channel(sink: S, channel: impl Into<String>) -> Self {
        Self {
            sink,
            channel: channel.into(),
            reported: 0,
            push_failures: 0,
        }
    }

    /// Report `err`. Returns true if a record was pushed successfully.
    ///
    /// Filtered frames produce no record.
    pub fn report(&mut self, err: &DecodeError) -> bool {
        let Some(record) = DiagnosticRecord::from_error(err) else {
            return false;
        };

        match self.sink.push(&self.channel, &record) {
            Ok(()) => {
                self.reported = self.reported.saturating_add(1);
                true
            }
            Err(push_err) => {
                self.push_failures = self.push_failures.saturating_add(1);
                tracing::warn!(
                    channel = %self.channel,
                    kind = record.kind.as_str(),
                    error = %push_err,
                    "failed to push decode error record"
                );
                false
            }
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn reported(&self) -> u64 {
        self.reported
    }

    pub fn push_failures(&self) -> u64 {
        self.push_failures
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
