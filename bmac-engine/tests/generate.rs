// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bmac_engine::config::{ElementEncoding, KernelKind, MacConfig};
use bmac_engine::generate::{Pattern, generate, write_buffer};
use bmac_engine::sram::SramBuffer;
use bmac_engine::test_helpers::tiny_config;
use bmac_engine::types::MacError;

#[test]
fn random_is_seeded() {
    let config = MacConfig {
        cycles: 2,
        ..MacConfig::default()
    };
    let first = generate(&config, &Pattern::Random { seed: 42 }).unwrap();
    let again = generate(&config, &Pattern::Random { seed: 42 }).unwrap();
    let other = generate(&config, &Pattern::Random { seed: 43 }).unwrap();

    assert_eq!(first.len(), 32);
    assert_eq!(first.words(), again.words());
    assert_ne!(first.words(), other.words());
    assert!(first.words().iter().all(|w| w.width() == 264));
}

#[test]
fn linear_pattern() {
    let config = MacConfig {
        banks: 2,
        cycles: 1,
        counter_mod: 2,
        elements: 3,
        word_bits: 32,
        ..MacConfig::default()
    };
    let buffer = generate(&config, &Pattern::Linear).unwrap();
    let rows: Vec<_> = buffer
        .words()
        .iter()
        .map(|w| w.fields(8, 4, ElementEncoding::Signed).unwrap())
        .collect();
    // The fourth field is padding
    assert_eq!(rows, vec![vec![0, 1, 2, 0], vec![1, 2, 3, 0]]);
}

#[test]
fn linear_wraps_to_element_width() {
    let config = MacConfig {
        element_bits: 4,
        word_bits: 4,
        ..tiny_config(16, 1, 16)
    };
    let buffer = generate(&config, &Pattern::Linear).unwrap();
    assert_eq!(buffer.words()[15].to_string(), "1111");
    assert_eq!(
        buffer.words()[8].fields(4, 1, ElementEncoding::Signed).unwrap(),
        vec![-8]
    );
}

#[test]
fn constant_pattern() {
    let config = tiny_config(2, 2, 2);
    let buffer = generate(&config, &Pattern::Constant(-2)).unwrap();
    assert!(buffer.words().iter().all(|w| w.to_string() == "11111110"));

    assert!(matches!(
        generate(&config, &Pattern::Constant(128)),
        Err(MacError::OutOfRange { .. })
    ));
}

#[test]
fn vsq_rows_fill_whole_words() {
    let config = MacConfig {
        kernel: KernelKind::Vsq,
        elements: 40,
        ..MacConfig::default()
    };
    let buffer = generate(&config, &Pattern::Constant(1)).unwrap();
    assert_eq!(buffer.words()[0].to_string(), "00000001".repeat(33));
}

#[test]
fn written_buffer_reads_back() {
    let config = tiny_config(4, 2, 4);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("b_sram_binary.txt");

    let buffer = generate(&config, &Pattern::Random { seed: 7 }).unwrap();
    write_buffer(&path, &buffer).unwrap();
    let read = SramBuffer::from_file(&path, &config).unwrap();
    assert_eq!(read.words(), buffer.words());
}
