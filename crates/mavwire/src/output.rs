use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mavwire_codec::{DecodedMessage, DiagnosticRecord};
use mavwire_schema::{SchemaEntry, SchemaRegistry};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageSummary<'a> {
    id: u32,
    name: &'a str,
    length: usize,
    crc_extra: u8,
    fields: usize,
}

#[derive(Serialize)]
struct FieldLayout<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    field_type: String,
    offset: usize,
    width: usize,
    extension: bool,
}

#[derive(Serialize)]
struct MessageLayout<'a> {
    id: u32,
    name: &'a str,
    length: usize,
    crc_extra: u8,
    fields: Vec<FieldLayout<'a>>,
}

/// One encoded frame as shown by `encode --hex`.
#[derive(Debug, Serialize)]
pub struct EncodedFrame<'a> {
    pub msg_id: u32,
    pub msg_name: &'a str,
    pub sequence: u8,
    pub length: usize,
    pub hex: String,
}

pub fn render_message(msg: &DecodedMessage, format: OutputFormat) -> String {
    let record = msg.to_record();
    match format {
        OutputFormat::Json => json_line(&record),
        OutputFormat::Table => key_value_table(&record),
        OutputFormat::Pretty => {
            let fields: Vec<String> = msg
                .fields
                .iter()
                .map(|(name, value)| format!("{name}={}", cell(&value.to_json())))
                .collect();
            format!(
                "{} #{} from {}/{} seq={}: {}",
                msg.name,
                msg.id,
                msg.source_system,
                msg.source_component,
                msg.sequence,
                fields.join(" ")
            )
        }
    }
}

pub fn render_diagnostic(channel: &str, record: &DiagnosticRecord, format: OutputFormat) -> String {
    let mut map = Map::new();
    map.insert("channel".to_string(), Value::from(channel));
    if let Ok(Value::Object(fields)) = serde_json::to_value(record) {
        map.extend(fields);
    }

    match format {
        OutputFormat::Json => json_line(&map),
        OutputFormat::Table => key_value_table(&map),
        OutputFormat::Pretty => format!(
            "{channel} [{}] from {}/{}: {} ({} bytes) {}",
            record.kind.as_str(),
            record.source_system,
            record.source_component,
            record.message,
            record.frame_length,
            record.raw_hex
        ),
    }
}

pub fn render_encoded(frame: &EncodedFrame<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json_line(frame),
        OutputFormat::Table => {
            let mut table = new_table(vec!["MSGNAME", "MSGID", "SEQ", "LENGTH", "HEX"]);
            table.add_row(vec![
                frame.msg_name.to_string(),
                frame.msg_id.to_string(),
                frame.sequence.to_string(),
                frame.length.to_string(),
                frame.hex.clone(),
            ]);
            table.to_string()
        }
        OutputFormat::Pretty => frame.hex.clone(),
    }
}

pub fn render_catalog(registry: &SchemaRegistry, format: OutputFormat) -> String {
    let summaries: Vec<MessageSummary<'_>> = registry
        .messages()
        .map(|schema| MessageSummary {
            id: schema.id(),
            name: schema.name(),
            length: schema.canonical_length(),
            crc_extra: schema.crc_extra(),
            fields: schema.fields().len(),
        })
        .collect();

    match format {
        OutputFormat::Json => json_line(&summaries),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "NAME", "LENGTH", "CRC_EXTRA", "FIELDS"]);
            for s in &summaries {
                table.add_row(vec![
                    s.id.to_string(),
                    s.name.to_string(),
                    s.length.to_string(),
                    s.crc_extra.to_string(),
                    s.fields.to_string(),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => summaries
            .iter()
            .map(|s| {
                format!(
                    "{:>6}  {:<24} len={:<3} crc_extra={}",
                    s.id, s.name, s.length, s.crc_extra
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_layout(schema: &SchemaEntry, format: OutputFormat) -> String {
    let layout = MessageLayout {
        id: schema.id(),
        name: schema.name(),
        length: schema.canonical_length(),
        crc_extra: schema.crc_extra(),
        fields: schema
            .fields()
            .iter()
            .map(|field| FieldLayout {
                name: field.name(),
                field_type: field.field_type().to_string(),
                offset: field.offset(),
                width: field.width(),
                extension: field.is_extension(),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => json_line(&layout),
        OutputFormat::Table => {
            let mut table = new_table(vec!["OFFSET", "FIELD", "TYPE", "WIDTH", "EXTENSION"]);
            for field in &layout.fields {
                table.add_row(vec![
                    field.offset.to_string(),
                    field.name.to_string(),
                    field.field_type.clone(),
                    field.width.to_string(),
                    if field.extension { "yes" } else { "" }.to_string(),
                ]);
            }
            format!(
                "{} (id {}, {} bytes, crc_extra {})\n{table}",
                layout.name, layout.id, layout.length, layout.crc_extra
            )
        }
        OutputFormat::Pretty => {
            let mut out = format!(
                "{} id={} len={} crc_extra={}",
                layout.name, layout.id, layout.length, layout.crc_extra
            );
            for field in &layout.fields {
                let ext = if field.extension { " (ext)" } else { "" };
                out.push_str(&format!(
                    "\n  {:>3}  {} {}{ext}",
                    field.offset, field.field_type, field.name
                ));
            }
            out
        }
    }
}

pub fn print_raw(data: &[u8]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(data)?;
    out.flush()
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn key_value_table(record: &Map<String, Value>) -> String {
    let mut table = new_table(vec!["FIELD", "VALUE"]);
    for (key, value) in record {
        table.add_row(vec![key.clone(), cell(value)]);
    }
    table.to_string()
}

fn json_line<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mavwire_codec::{DecodeError, DecodeErrorKind, FrameDecoder};
    use mavwire_frame::RawFrame;

    use super::*;

    const HEARTBEAT: &str = "fd090000000101000000000000000203510303e292";

    fn heartbeat() -> DecodedMessage {
        let registry = Arc::new(SchemaRegistry::common().unwrap());
        let frame = RawFrame::new(hex::decode(HEARTBEAT).unwrap());
        FrameDecoder::new(registry).decode(&frame, None).unwrap()
    }

    #[test]
    fn message_json_is_one_flat_record() {
        let line = render_message(&heartbeat(), OutputFormat::Json);
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["MSGNAME"], "HEARTBEAT");
        assert_eq!(value["SYSID"], 1);
        assert_eq!(value["autopilot"], 3);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn message_pretty_lists_fields_in_wire_order() {
        let line = render_message(&heartbeat(), OutputFormat::Pretty);
        assert!(line.starts_with("HEARTBEAT #0 from 1/1 seq=0: custom_mode=0 type=2"));
        assert!(line.ends_with("mavlink_version=3"));
    }

    #[test]
    fn diagnostic_json_leads_with_channel() {
        let err = DecodeError {
            kind: DecodeErrorKind::UnknownMessageId(77),
            raw: hex::decode("fd00").unwrap().into(),
            source_system: 0,
            source_component: 0,
            timestamp_us: 5,
        };
        let record = DiagnosticRecord::from_error(&err).unwrap();
        let line = render_diagnostic("DECODE_ERROR", &record, OutputFormat::Json);
        assert!(line.starts_with(r#"{"channel":"DECODE_ERROR","MSGID":65535"#));

        let pretty = render_diagnostic("DIAG", &record, OutputFormat::Pretty);
        assert_eq!(
            pretty,
            "DIAG [UNKNOWN_MESSAGE] from 0/0: unknown message id 77 (2 bytes) fd00"
        );
    }

    #[test]
    fn layout_shows_offsets() {
        let registry = SchemaRegistry::common().unwrap();
        let schema = registry.lookup_by_name("HEARTBEAT").unwrap();
        let json: Value = serde_json::from_str(&render_layout(schema, OutputFormat::Json)).unwrap();
        assert_eq!(json["length"], 9);
        assert_eq!(json["crc_extra"], 50);
        assert_eq!(json["fields"][0]["name"], "custom_mode");
        assert_eq!(json["fields"][0]["type"], "uint32_t");
        assert_eq!(json["fields"][1]["offset"], 4);
    }

    #[test]
    fn catalog_lists_every_message() {
        let registry = SchemaRegistry::common().unwrap();
        let json: Value =
            serde_json::from_str(&render_catalog(&registry, OutputFormat::Json)).unwrap();
        assert_eq!(json.as_array().unwrap().len(), registry.len());
        assert_eq!(json[0]["name"], "HEARTBEAT");
    }
}
