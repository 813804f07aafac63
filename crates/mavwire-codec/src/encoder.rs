use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use mavwire_frame::{encode_frame, Header};
use mavwire_schema::{SchemaEntry, SchemaRegistry};
use serde_json::{Map, Value};

use crate::config::EncoderConfig;
use crate::error::{EncodeError, Result};
use crate::value::write_field;

/// Key naming the message in a command document.
pub const MSGNAME_KEY: &str = "MSGNAME";

/// Builds outbound frames and owns the sender's sequence counter.
///
/// One encoder per link: the counter is plain mutable state, so sharing an
/// encoder across threads needs the caller's own lock.
#[derive(Debug, Clone)]
pub struct CommandEncoder {
    registry: Arc<SchemaRegistry>,
    config: EncoderConfig,
    sequence: u8,
}

impl CommandEncoder {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, EncoderConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: EncoderConfig) -> Self {
        Self {
            registry,
            config,
            sequence: 0,
        }
    }

    /// Encode `name` with the given field values.
    ///
    /// Each schema field is taken from an exact-case key, then from a key
    /// differing only in case, else it is zero. Keys that match no field
    /// are ignored.
    pub fn encode(&mut self, name: &str, fields: &Map<String, Value>) -> Result<Bytes> {
        let schema = self
            .registry
            .lookup_by_name(name)
            .ok_or_else(|| EncodeError::UnknownMessage(name.to_string()))?;

        let mut payload = vec![0u8; schema.canonical_length()];
        for field in schema.fields() {
            write_field(field, resolve(fields, field.name()), &mut payload)?;
        }

        let frame = self.frame(schema, &payload)?;
        tracing::info!(
            msg_name = schema.name(),
            seq = self.sequence,
            size = frame.len(),
            "encoded command"
        );
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    /// Encode a command document such as `{"MSGNAME": "PING", "seq": 7}`.
    pub fn encode_value(&mut self, command: &Value) -> Result<Bytes> {
        let Value::Object(map) = command else {
            return Err(EncodeError::NotAnObject);
        };
        let (name_key, name) = map
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(MSGNAME_KEY))
            .ok_or(EncodeError::MissingMessageName)?;
        let Value::String(name) = name else {
            return Err(EncodeError::MissingMessageName);
        };

        let mut fields = map.clone();
        fields.remove(name_key.as_str());
        self.encode(name, &fields)
    }

    /// Parse and encode a JSON command document.
    pub fn encode_json(&mut self, input: impl AsRef<[u8]>) -> Result<Bytes> {
        let command: Value = serde_json::from_slice(input.as_ref())?;
        self.encode_value(&command)
    }

    /// Sequence number the next frame will carry.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Restart the sequence at zero.
    pub fn reset(&mut self) {
        self.sequence = 0;
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn frame(&self, schema: &SchemaEntry, payload: &[u8]) -> Result<Bytes> {
        let payload = if self.config.truncate_payload {
            truncate_trailing_zeros(payload)
        } else {
            payload
        };
        let header = Header {
            payload_len: u8::try_from(payload.len()).map_err(|_| {
                mavwire_frame::FrameError::PayloadTooLarge {
                    size: payload.len(),
                    max: mavwire_frame::MAX_PAYLOAD_LEN,
                }
            })?,
            incompat_flags: 0,
            compat_flags: 0,
            sequence: self.sequence,
            source_system: self.config.source_system,
            source_component: self.config.source_component,
            message_id: schema.id(),
        };

        let mut dst = BytesMut::with_capacity(header.frame_len());
        encode_frame(&header, payload, schema.crc_extra(), &mut dst)?;
        Ok(dst.freeze())
    }
}

fn resolve<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// MAVLink v2 senders may drop trailing zero bytes, keeping at least one.
fn truncate_trailing_zeros(payload: &[u8]) -> &[u8] {
    let end = payload
        .iter()
        .rposition(|b| *b != 0)
        .map_or(1, |last| last + 1);
    &payload[..end.min(payload.len())]
}
