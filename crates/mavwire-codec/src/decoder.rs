use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{BufMut, Bytes, BytesMut};
use mavwire_frame::{frame_checksum, RawFrame, HEADER_LEN};
use mavwire_schema::SchemaRegistry;
use serde_json::{Map, Value};

use crate::error::{DecodeError, DecodeErrorKind};
use crate::value::{read_field, FieldValue};

/// A successfully decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub id: u32,
    pub name: String,
    pub sequence: u8,
    pub source_system: u8,
    pub source_component: u8,
    /// Field values in schema order.
    pub fields: Vec<(String, FieldValue)>,
    packet: Bytes,
}

impl DecodedMessage {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Received header followed by the zero-extended payload.
    pub fn packet(&self) -> &Bytes {
        &self.packet
    }

    /// Flat key/value record: the metadata keys followed by the schema fields.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("MSGID".to_string(), Value::from(self.id));
        record.insert("MSGNAME".to_string(), Value::from(self.name.clone()));
        record.insert("SYSID".to_string(), Value::from(self.source_system));
        record.insert("COMPID".to_string(), Value::from(self.source_component));
        record.insert("SEQ".to_string(), Value::from(self.sequence));
        for (name, value) in &self.fields {
            record.insert(name.clone(), value.to_json());
        }
        record
    }
}

/// Stateless frame decoder over a shared registry.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    registry: Arc<SchemaRegistry>,
}

impl FrameDecoder {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Validate and decode one candidate frame.
    ///
    /// `target_filter` of `None` or `Some(0)` accepts every source system.
    pub fn decode(
        &self,
        frame: &RawFrame,
        target_filter: Option<u8>,
    ) -> Result<DecodedMessage, DecodeError> {
        let fail = |kind: DecodeErrorKind| DecodeError {
            kind,
            raw: Bytes::copy_from_slice(frame.as_bytes()),
            source_system: frame.source_system().unwrap_or(0),
            source_component: frame.source_component().unwrap_or(0),
            timestamp_us: now_micros(),
        };

        let Some(header) = frame.header() else {
            return Err(fail(DecodeErrorKind::Framing("missing sync byte or short header")));
        };
        if !frame.is_complete() {
            return Err(fail(DecodeErrorKind::Framing(
                "frame length disagrees with declared payload length",
            )));
        }
        if header.incompat_flags != 0 {
            return Err(fail(DecodeErrorKind::Framing(
                "unsupported incompatibility flags",
            )));
        }

        let Some(schema) = self.registry.lookup_by_id(header.message_id) else {
            tracing::warn!(msg_id = header.message_id, "unknown MAVLink message id");
            return Err(fail(DecodeErrorKind::UnknownMessageId(header.message_id)));
        };

        // Checksum covers the bytes as transmitted, before zero-extension.
        let (Some(span), Some(received)) = (frame.checked_span(), frame.checksum()) else {
            return Err(fail(DecodeErrorKind::Framing("truncated checksum")));
        };
        let computed = frame_checksum(span, schema.crc_extra());
        if computed != received {
            tracing::warn!(
                msg_id = header.message_id,
                msg_name = schema.name(),
                computed,
                received,
                "checksum mismatch"
            );
            return Err(fail(DecodeErrorKind::Checksum { computed, received }));
        }

        if let Some(target) = target_filter.filter(|target| *target != 0) {
            if header.source_system != target {
                tracing::trace!(sysid = header.source_system, target, "frame filtered out");
                return Err(fail(DecodeErrorKind::FilteredOut));
            }
        }

        let transmitted = &span[HEADER_LEN..];
        let canonical = schema.canonical_length();
        let mut packet = BytesMut::with_capacity(HEADER_LEN + canonical);
        packet.put_slice(&span[..HEADER_LEN]);
        let kept = transmitted.len().min(canonical);
        packet.put_slice(&transmitted[..kept]);
        packet.put_bytes(0, canonical - kept);
        let payload = &packet[HEADER_LEN..];

        let fields = schema
            .fields()
            .iter()
            .map(|field| (field.name().to_string(), read_field(field, payload)))
            .collect();

        tracing::debug!(
            msg_id = header.message_id,
            msg_name = schema.name(),
            sysid = header.source_system,
            compid = header.source_component,
            seq = header.sequence,
            "decoded frame"
        );

        Ok(DecodedMessage {
            id: header.message_id,
            name: schema.name().to_string(),
            sequence: header.sequence,
            source_system: header.source_system,
            source_component: header.source_component,
            fields,
            packet: packet.freeze(),
        })
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
