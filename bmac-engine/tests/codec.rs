// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bmac_engine::bits::{BitField, MAX_FIELD_BITS, pack, pack_with, unpack, unpack_with};
use bmac_engine::config::ElementEncoding;
use bmac_engine::types::MacError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn pack_twos_complement() {
    assert_eq!(pack(&[3, -1], 8).unwrap(), "0000001111111111");
    assert_eq!(pack(&[-8, 7], 4).unwrap(), "10000111");
    assert_eq!(pack(&[], 8).unwrap(), "");
}

#[test]
fn unpack_twos_complement() {
    assert_eq!(unpack("0000001111111111", 8, 2).unwrap(), vec![3, -1]);
    assert_eq!(unpack("10000111", 4, 2).unwrap(), vec![-8, 7]);
}

#[test]
fn unpack_ignores_trailing_bits() {
    assert_eq!(unpack("00000011", 4, 1).unwrap(), vec![0]);
    assert_eq!(unpack("0001111111", 4, 2).unwrap(), vec![1, -1]);
}

#[test]
fn unsigned_encoding() {
    assert_eq!(
        pack_with(&[255, 1], 8, ElementEncoding::Unsigned).unwrap(),
        "1111111100000001"
    );
    assert_eq!(
        unpack_with("1111111100000001", 8, 2, ElementEncoding::Unsigned).unwrap(),
        vec![255, 1]
    );
}

#[test]
fn random_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for bits in [1u32, 4, 8, 13, 32] {
        let half = 1i64 << (bits - 1);
        let values: Vec<i64> = (0..64).map(|_| rng.gen_range(-half..half)).collect();
        let packed = pack(&values, bits).unwrap();
        assert_eq!(packed.len(), values.len() * bits as usize);
        assert_eq!(unpack(&packed, bits, values.len()).unwrap(), values);
    }
}

#[test]
fn pack_out_of_range() {
    match pack(&[1, 128], 8) {
        Err(MacError::OutOfRange {
            context,
            value,
            bits,
        }) => {
            assert_eq!(context, "element 1");
            assert_eq!(value, 128);
            assert_eq!(bits, 8);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        pack(&[-129], 8),
        Err(MacError::OutOfRange { .. })
    ));
    assert!(matches!(
        pack_with(&[-1], 8, ElementEncoding::Unsigned),
        Err(MacError::OutOfRange { .. })
    ));
    assert!(matches!(
        pack_with(&[256], 8, ElementEncoding::Unsigned),
        Err(MacError::OutOfRange { .. })
    ));
}

#[test]
fn unpack_malformed() {
    assert!(matches!(
        unpack("0000x011", 8, 1),
        Err(MacError::MalformedInput { .. })
    ));
    assert!(matches!(
        unpack("00000011", 8, 2),
        Err(MacError::MalformedInput { .. })
    ));
}

#[test]
fn accumulator_width_is_enforced() {
    let acc = BitField::new(12, 24);
    assert_eq!(acc.to_string(), "000000000000000000001100");
    assert_eq!(acc.wrapping_add(0xff_fff4).value(), 0);
    assert!(BitField::from_signed(-1, 0).is_err());
    assert_eq!(BitField::from_signed(i64::MIN, 64).unwrap().to_signed(), i64::MIN);
}

#[test]
fn widest_field_round_trips() {
    let values = [-1, i64::MIN, i64::MAX];
    let packed = pack(&values, MAX_FIELD_BITS).unwrap();
    assert_eq!(packed.len(), 3 * 64);
    assert_eq!(&packed[..64], "1".repeat(64));
    assert_eq!(unpack(&packed, MAX_FIELD_BITS, 3).unwrap(), values);
}

#[test]
fn field_wider_than_codec_is_rejected() {
    assert!(matches!(
        pack(&[-1], MAX_FIELD_BITS + 1),
        Err(MacError::OutOfRange { bits: 65, .. })
    ));
    assert!(matches!(
        pack_with(&[1], MAX_FIELD_BITS + 1, ElementEncoding::Unsigned),
        Err(MacError::OutOfRange { bits: 65, .. })
    ));
    assert!(matches!(
        unpack(&"1".repeat(65), MAX_FIELD_BITS + 1, 1),
        Err(MacError::MalformedInput { .. })
    ));
}

#[test]
fn zero_width_is_rejected_both_ways() {
    assert!(matches!(
        pack(&[0], 0),
        Err(MacError::OutOfRange { bits: 0, .. })
    ));
    match unpack("0101", 0, 2) {
        Err(MacError::MalformedInput { context, .. }) => assert_eq!(context, "field width"),
        other => panic!("unexpected {other:?}"),
    }
}
