//! Integration tests for the native `NDHS` format.
//!
//! These verify that every storage depth and axis kind survives a
//! round-trip, that zero-suppression is transparent, and that corrupt
//! streams fail explicitly instead of producing a histogram.

use ndhist::axis::{AxisOptions, CategoryAxis, IntegerAxis, RegularAxis};
use ndhist::io::{DeserializeError, NativeCodec, Payload, HEADER_SIZE};
use ndhist::storage::CountDepth;
use ndhist::Histogram;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

// ============================================================================
// Test Histogram Builders
// ============================================================================

fn roundtrip(h: &Histogram) -> Histogram {
    let codec = NativeCodec::new();
    let bytes = codec.serialize(h).unwrap();
    codec.deserialize(&bytes).unwrap()
}

fn all_kinds() -> Histogram {
    Histogram::new(vec![
        RegularAxis::new(4, -1.0, 1.0).unwrap().into(),
        IntegerAxis::new(-2, 3, AxisOptions::flow()).unwrap().into(),
        CategoryAxis::new(vec![10, 20, 30]).unwrap().into(),
    ])
}

fn storage_is_suppressed(h: &Histogram) -> bool {
    let Payload::V1(v1) = Payload::from_histogram(h);
    v1.storage.zero_suppressed
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn fresh_histogram_round_trips_unallocated() {
    let h = all_kinds();
    assert_eq!(h.storage().depth(), CountDepth::Unallocated);
    let loaded = roundtrip(&h);
    assert_eq!(loaded.storage().depth(), CountDepth::Unallocated);
    assert_eq!(loaded, h);
}

#[test]
fn each_depth_round_trips() {
    // u8 depth
    let mut h = all_kinds();
    h.fill(&[0.3, 0.0, 20.0]).unwrap();
    assert_eq!(h.storage().depth(), CountDepth::U8);
    assert_eq!(roundtrip(&h), h);

    // u16 depth
    for _ in 0..300 {
        h.fill(&[0.3, 0.0, 20.0]).unwrap();
    }
    assert_eq!(h.storage().depth(), CountDepth::U16);
    assert_eq!(roundtrip(&h), h);

    // weighted depth
    h.fill_weighted(&[0.3, 0.0, 20.0], 0.75).unwrap();
    assert_eq!(h.storage().depth(), CountDepth::Weighted);
    assert_eq!(roundtrip(&h), h);
}

#[test]
fn every_axis_kind_round_trips_its_metadata() {
    let mut h = all_kinds();
    h.fill(&[0.3, -2.0, 10.0]).unwrap();
    h.fill(&[5.0, 2.0, 99.0]).unwrap(); // overflow bins
    let loaded = roundtrip(&h);
    assert_eq!(loaded.axes(), h.axes());
    assert_eq!(loaded, h);
}

#[test]
fn grown_axes_round_trip() {
    let mut h = Histogram::new(vec![
        IntegerAxis::growable(0, 1).unwrap().into(),
        CategoryAxis::growable(vec![1]).unwrap().into(),
    ]);
    h.fill(&[0.0, 1.0]).unwrap();
    h.fill(&[-2.0, 7.0]).unwrap();
    h.fill(&[5.0, 7.0]).unwrap();

    let loaded = roundtrip(&h);
    assert_eq!(loaded.axis(0), h.axis(0));
    assert_eq!(loaded.axis(1), h.axis(1));
    assert_eq!(loaded, h);
}

#[test]
fn randomized_round_trips() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1234);
    for round in 0..10 {
        let mut h = all_kinds();
        for _ in 0..200 {
            let coords = [
                rng.random_range(-2.0..2.0),
                rng.random_range(-4.0..5.0),
                (rng.random_range(1..4) * 10) as f64,
            ];
            if round % 2 == 0 {
                h.fill(&coords).unwrap();
            } else {
                h.fill_weighted(&coords, rng.random_range(0.0..2.0)).unwrap();
            }
        }
        assert_eq!(roundtrip(&h), h, "round {round}");
    }
}

// ============================================================================
// Zero-Suppression
// ============================================================================

#[test]
fn sparse_and_dense_payloads_choose_their_encoding() {
    // 1000 bins, one of them at 42: zero-suppressed.
    let mut sparse = Histogram::new(vec![RegularAxis::with_options(
        1000,
        0.0,
        1.0,
        AxisOptions::empty(),
    )
    .unwrap()
    .into()]);
    for _ in 0..42 {
        sparse.fill(&[0.5005]).unwrap();
    }
    assert!(storage_is_suppressed(&sparse));

    // Same shape, every bin at one: raw.
    let mut dense = Histogram::new(vec![RegularAxis::with_options(
        1000,
        0.0,
        1.0,
        AxisOptions::empty(),
    )
    .unwrap()
    .into()]);
    for i in 0..1000 {
        dense.fill(&[(i as f64 + 0.5) / 1000.0]).unwrap();
    }
    assert!(!storage_is_suppressed(&dense));

    // Both encodings are invisible after a round-trip.
    assert_eq!(roundtrip(&sparse), sparse);
    assert_eq!(roundtrip(&dense), dense);
}

#[test]
fn suppressed_stream_is_smaller_on_the_wire() {
    let mut sparse = Histogram::new(vec![RegularAxis::new(1000, 0.0, 1.0).unwrap().into()]);
    sparse.fill(&[0.5]).unwrap();
    let mut dense = sparse.clone();
    for i in 0..1000 {
        dense.fill(&[(i as f64 + 0.5) / 1000.0]).unwrap();
    }

    let codec = NativeCodec::new();
    let sparse_bytes = codec.serialize(&sparse).unwrap();
    let dense_bytes = codec.serialize(&dense).unwrap();
    assert!(sparse_bytes.len() < dense_bytes.len() / 4);
}

// ============================================================================
// Corrupt Streams
// ============================================================================

#[test]
fn wrong_magic_is_not_a_histogram() {
    let codec = NativeCodec::new();
    let mut bytes = codec.serialize(&all_kinds()).unwrap();
    bytes[0..4].copy_from_slice(b"BOOM");
    assert!(matches!(
        codec.deserialize(&bytes),
        Err(DeserializeError::NotAHistogram)
    ));
}

#[test]
fn newer_major_version_fails_explicitly() {
    let codec = NativeCodec::new();
    let mut bytes = codec.serialize(&all_kinds()).unwrap();
    bytes[4] = 99;
    assert!(matches!(
        codec.deserialize(&bytes),
        Err(DeserializeError::UnsupportedVersion { major: 99, .. })
    ));
}

#[test]
fn flipped_payload_byte_fails_the_checksum() {
    let codec = NativeCodec::new();
    let mut h = all_kinds();
    h.fill(&[0.0, 0.0, 10.0]).unwrap();
    let mut bytes = codec.serialize(&h).unwrap();
    bytes[HEADER_SIZE + 2] ^= 0x40;
    assert!(matches!(
        codec.deserialize(&bytes),
        Err(DeserializeError::ChecksumMismatch { .. })
    ));
}

#[test]
fn truncated_stream_is_reported() {
    let codec = NativeCodec::new();
    let bytes = codec.serialize(&all_kinds()).unwrap();
    for cut in [0, 5, HEADER_SIZE, bytes.len() - 1] {
        assert!(
            matches!(
                codec.deserialize(&bytes[..cut]),
                Err(DeserializeError::Truncated { .. })
            ),
            "cut at {cut}"
        );
    }
}
