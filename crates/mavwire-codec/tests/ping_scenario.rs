use std::sync::Arc;

use mavwire_codec::{
    DecodedMessage, DiagnosticRecord, ErrorKindTag, ErrorReporter, FieldValue, Session,
    SessionConfig,
};
use mavwire_schema::{MessageDefinition, SchemaRegistry};

// PING (id 1, one uint32 `seq` field) from the default ground-station
// identity 255/0, sequence 0, seq = 7.
const PING_WIRE: &str = "fd04000000ff00010000070000008dfd";

fn ping_registry() -> Arc<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry
        .register(&MessageDefinition::new(1, "PING").field("seq", "uint32_t"))
        .unwrap();
    Arc::new(registry)
}

#[test]
fn ping_schema_derivation() {
    let registry = ping_registry();
    let ping = registry.lookup_by_name("PING").unwrap();
    assert_eq!(ping.id(), 1);
    assert_eq!(ping.canonical_length(), 4);
    assert_eq!(ping.crc_extra(), 63);
}

#[test]
fn ping_command_encodes_to_reference_bytes() {
    let mut session = Session::new(ping_registry(), SessionConfig::default());
    let wire = session.encode_json(r#"{"MSGNAME": "PING", "seq": 7}"#).unwrap();
    assert_eq!(hex::encode(&wire), PING_WIRE);
    assert_eq!(wire.len(), 16);
}

#[test]
fn ping_bytes_decode_through_a_session() {
    let mut session = Session::new(ping_registry(), SessionConfig::default());
    let wire = hex::decode(PING_WIRE).unwrap();

    let mut messages: Vec<DecodedMessage> = Vec::new();
    let mut reporter = ErrorReporter::new(Vec::<DiagnosticRecord>::new());
    let stats = session.pump(&wire, &mut messages, &mut reporter);

    assert_eq!(stats.delivered, 1);
    let msg = &messages[0];
    assert_eq!(msg.name, "PING");
    assert_eq!((msg.source_system, msg.source_component), (255, 0));
    assert_eq!(msg.sequence, 0);
    assert_eq!(msg.field("seq"), Some(&FieldValue::UInt(7)));

    let record = msg.to_record();
    assert_eq!(record["MSGID"], 1);
    assert_eq!(record["SYSID"], 255);
    assert_eq!(record["COMPID"], 0);
    assert_eq!(record["seq"], 7);
}

#[test]
fn common_heartbeat_under_ping_registry_is_reported_unknown() {
    let mut session = Session::new(ping_registry(), SessionConfig::default());
    let heartbeat = hex::decode("fd090000000101000000000000000203510303e292").unwrap();
    let mut wire = hex::decode(PING_WIRE).unwrap();
    wire.splice(0..0, heartbeat.iter().copied());

    let mut messages: Vec<DecodedMessage> = Vec::new();
    let mut reporter = ErrorReporter::new(Vec::<DiagnosticRecord>::new());
    let stats = session.pump(&wire, &mut messages, &mut reporter);

    assert_eq!((stats.delivered, stats.reported), (1, 1));
    let records = reporter.into_sink();
    assert_eq!(records[0].kind, ErrorKindTag::UnknownMessage);
    assert_eq!((records[0].source_system, records[0].source_component), (1, 1));
    assert_eq!(records[0].raw_bytes().unwrap(), heartbeat);
}
