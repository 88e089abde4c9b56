// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use crate::config::MacConfig;
use crate::sram::{SramBuffer, SramWord};

/// A small configuration with one 8-bit element per word.
#[must_use]
pub fn tiny_config(banks: usize, cycles: usize, counter_mod: usize) -> MacConfig {
    MacConfig {
        banks,
        cycles,
        counter_mod,
        elements: 1,
        element_bits: 8,
        word_bits: 8,
        ..MacConfig::default()
    }
}

/// Build a buffer holding one word per entry of `rows`, each packing the
/// given elements with the configured element width and encoding.
///
/// Panics if a value does not fit.
#[must_use]
pub fn buffer_from_rows(name: &str, config: &MacConfig, rows: &[Vec<i64>]) -> SramBuffer {
    let words = rows
        .iter()
        .map(|row| {
            SramWord::from_fields(row, config.element_bits, config.encoding, config.word_bits)
                .unwrap()
        })
        .collect();
    SramBuffer::new(name, words, config).unwrap()
}
