use std::sync::Arc;

use mavwire_codec::{
    CommandEncoder, DecodeErrorKind, EncoderConfig, FieldValue, FrameDecoder, Session,
    SessionConfig,
};
use mavwire_frame::{RawFrame, HEADER_LEN};
use mavwire_schema::{FieldType, ScalarType, SchemaEntry, SchemaRegistry};
use proptest::prelude::*;
use serde_json::Map;

fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::common().unwrap())
}

fn pick(registry: &SchemaRegistry, index: usize) -> &SchemaEntry {
    registry.messages().nth(index % registry.len()).unwrap()
}

fn sample_scalar(scalar: ScalarType, seed: u64) -> FieldValue {
    match scalar {
        ScalarType::Char | ScalarType::UInt8 => FieldValue::UInt(seed & 0xFF),
        ScalarType::UInt16 => FieldValue::UInt(seed & 0xFFFF),
        ScalarType::UInt32 => FieldValue::UInt(seed & 0xFFFF_FFFF),
        ScalarType::UInt64 => FieldValue::UInt(seed),
        ScalarType::Int8 => FieldValue::Int(i64::from(seed as u8 as i8)),
        ScalarType::Int16 => FieldValue::Int(i64::from(seed as u16 as i16)),
        ScalarType::Int32 => FieldValue::Int(i64::from(seed as u32 as i32)),
        ScalarType::Int64 => FieldValue::Int(seed as i64),
        // Eighths below 2^17 are exact in both float widths.
        ScalarType::Float | ScalarType::Double => {
            FieldValue::Float(((seed % 2_000_001) as f64 - 1_000_000.0) / 8.0)
        }
    }
}

fn sample(field_type: FieldType, seed: u64) -> FieldValue {
    if field_type.is_text() {
        let len = (seed as usize) % (field_type.len() + 1);
        let text = (0..len)
            .map(|i| char::from(b'a' + ((seed >> (i % 60)) % 26) as u8))
            .collect();
        return FieldValue::Text(text);
    }
    match field_type.array_len {
        Some(len) => FieldValue::Array(
            (0..u64::from(len))
                .map(|i| sample_scalar(field_type.scalar, seed.rotate_left((i * 7) as u32) ^ i))
                .collect(),
        ),
        None => sample_scalar(field_type.scalar, seed),
    }
}

type Command = (Map<String, serde_json::Value>, Vec<(String, FieldValue)>);

/// Field values drawn from `seeds`; fields whose `zeroed` flag is set stay zero.
fn command_with_zeros(schema: &SchemaEntry, seeds: &[u64], zeroed: &[bool]) -> Command {
    let mut json = Map::new();
    let mut expected = Vec::new();
    for (i, field) in schema.fields().iter().enumerate() {
        let value = if zeroed.get(i).copied().unwrap_or(false) {
            FieldValue::zero(field.field_type())
        } else {
            sample(field.field_type(), seeds[i % seeds.len()])
        };
        json.insert(field.name().to_string(), value.to_json());
        expected.push((field.name().to_string(), value));
    }
    (json, expected)
}

fn command(schema: &SchemaEntry, seeds: &[u64]) -> Command {
    command_with_zeros(schema, seeds, &[])
}

proptest! {
    #[test]
    fn every_common_message_round_trips(
        index in 0usize..256,
        seeds in proptest::collection::vec(any::<u64>(), 1..32),
    ) {
        let registry = registry();
        let schema = pick(&registry, index);
        let (json, expected) = command(schema, &seeds);

        let mut encoder = CommandEncoder::new(Arc::clone(&registry));
        let wire = encoder.encode(schema.name(), &json).unwrap();
        prop_assert_eq!(wire.len(), HEADER_LEN + schema.canonical_length() + 2);

        let decoded = FrameDecoder::new(registry.clone())
            .decode(&RawFrame::new(wire), None)
            .unwrap();
        prop_assert_eq!(decoded.id, schema.id());
        prop_assert_eq!(decoded.fields, expected);
    }

    #[test]
    fn truncated_frames_decode_to_the_same_values(
        index in 0usize..256,
        seeds in proptest::collection::vec(any::<u64>(), 1..32),
        zeroed in proptest::collection::vec(any::<bool>(), 0..32),
    ) {
        let registry = registry();
        let schema = pick(&registry, index);
        let (json, _) = command_with_zeros(schema, &seeds, &zeroed);

        let config = EncoderConfig { truncate_payload: true, ..EncoderConfig::default() };
        let mut truncating = CommandEncoder::with_config(Arc::clone(&registry), config);
        let mut full = CommandEncoder::new(Arc::clone(&registry));

        let short = truncating.encode(schema.name(), &json).unwrap();
        let long = full.encode(schema.name(), &json).unwrap();
        let declared = usize::from(short[1]);
        prop_assert!(declared >= 1);
        prop_assert!(declared <= schema.canonical_length());
        let span = HEADER_LEN..HEADER_LEN + declared;
        prop_assert_eq!(&short[span.clone()], &long[span]);
        prop_assert!(long[HEADER_LEN + declared..long.len() - 2].iter().all(|b| *b == 0));

        let decoder = FrameDecoder::new(registry.clone());
        let a = decoder.decode(&RawFrame::new(short), None).unwrap();
        let b = decoder.decode(&RawFrame::new(long), None).unwrap();
        prop_assert_eq!(&a.fields, &b.fields);
        prop_assert_eq!(a.packet()[HEADER_LEN..].to_vec(), b.packet()[HEADER_LEN..].to_vec());
    }

    #[test]
    fn single_bit_flip_fails_the_checksum(
        index in 0usize..256,
        seeds in proptest::collection::vec(any::<u64>(), 1..32),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let registry = registry();
        let schema = pick(&registry, index);
        let (json, _) = command(schema, &seeds);
        let wire = CommandEncoder::new(Arc::clone(&registry)).encode(schema.name(), &json).unwrap();

        let mut corrupted = wire.to_vec();
        let at = HEADER_LEN + position.index(corrupted.len() - HEADER_LEN);
        corrupted[at] ^= 1 << bit;

        let err = FrameDecoder::new(registry)
            .decode(&RawFrame::new(corrupted), None)
            .unwrap_err();
        prop_assert!(matches!(err.kind, DecodeErrorKind::Checksum { .. }), "{:?}", err.kind);
    }

    #[test]
    fn target_filter_accepts_only_matching_sources(sysid in any::<u8>(), target in 1u8..=255) {
        let registry = registry();
        let config = EncoderConfig { source_system: sysid, ..EncoderConfig::default() };
        let wire = CommandEncoder::with_config(Arc::clone(&registry), config)
            .encode("HEARTBEAT", &Map::new())
            .unwrap();

        let decoder = FrameDecoder::new(registry);
        let frame = RawFrame::new(wire);
        let outcome = decoder.decode(&frame, Some(target));
        if sysid == target {
            prop_assert!(outcome.is_ok());
        } else {
            prop_assert!(outcome.unwrap_err().is_filtered());
        }
        prop_assert!(decoder.decode(&frame, None).is_ok());
    }

    #[test]
    fn byte_at_a_time_matches_single_feed(
        picks in proptest::collection::vec((0usize..256, any::<u64>()), 1..6),
        noise in proptest::collection::vec(any::<u8>().prop_filter("no sync", |b| *b != 0xFD), 0..16),
    ) {
        let registry = registry();
        let mut encoder = CommandEncoder::new(Arc::clone(&registry));
        let mut stream = noise;
        for (index, seed) in &picks {
            let schema = pick(&registry, *index);
            let (json, _) = command(schema, &[*seed]);
            stream.extend_from_slice(&encoder.encode(schema.name(), &json).unwrap());
        }

        let mut whole = Session::new(Arc::clone(&registry), SessionConfig::default());
        let expected: Vec<_> = whole.feed(&stream).map(Result::unwrap).collect();

        let mut trickle = Session::new(registry, SessionConfig::default());
        let mut actual = Vec::new();
        for byte in &stream {
            actual.extend(trickle.feed(std::slice::from_ref(byte)).map(Result::unwrap));
        }

        prop_assert_eq!(expected.len(), picks.len());
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(trickle.buffered(), 0);
    }

    #[test]
    fn sequence_counts_successful_encodes_modulo_256(count in 0usize..600) {
        let mut encoder = CommandEncoder::new(registry());
        for _ in 0..count {
            encoder.encode("HEARTBEAT", &Map::new()).unwrap();
        }
        prop_assert_eq!(usize::from(encoder.sequence()), count % 256);
    }
}
