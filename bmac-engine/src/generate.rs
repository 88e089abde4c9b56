// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! SRAM test-vector generation.
//!
//! Produces buffers of exactly `banks * cycles` words of `word_bits` bits,
//! either fully random or following a deterministic element pattern.

use std::path::Path;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bits::BitField;
use crate::config::MacConfig;
use crate::output::write_lines;
use crate::sram::{SramBuffer, SramWord};
use crate::types::MacResult;

/// Contents of a generated buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Every bit of every word drawn from an RNG seeded with `seed`.
    Random { seed: u64 },

    /// Element `i` of word `r` holds the low `element_bits` bits of `r + i`.
    Linear,

    /// Every element holds the same value, encoded with the configured
    /// element encoding.
    Constant(i64),
}

/// Build a buffer following `pattern`.
pub fn generate(config: &MacConfig, pattern: &Pattern) -> MacResult<SramBuffer> {
    config.validate()?;
    let num_words = config.words_per_buffer();
    // VSQ rows may declare more elements than a word can hold
    let elements = config
        .elements
        .min(config.word_bits / config.element_bits as usize);

    let words = match pattern {
        Pattern::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            (0..num_words)
                .map(|_| SramWord::from_bits((0..config.word_bits).map(|_| rng.gen_bool(0.5))))
                .collect()
        }
        Pattern::Linear => (0..num_words)
            .map(|row| {
                let mut word = SramWord::zeros(config.word_bits);
                for element in 0..elements {
                    let field = BitField::new((row + element) as u64, config.element_bits);
                    word.set_field(element * config.element_bits as usize, field)?;
                }
                Ok(word)
            })
            .collect::<MacResult<Vec<_>>>()?,
        Pattern::Constant(value) => {
            let values = vec![*value; elements];
            let word = SramWord::from_fields(
                &values,
                config.element_bits,
                config.encoding,
                config.word_bits,
            )?;
            vec![word; num_words]
        }
    };

    SramBuffer::new("generated", words, config)
}

/// Write a buffer as one binary word per line.
pub fn write_buffer(path: &Path, buffer: &SramBuffer) -> MacResult<()> {
    let lines: Vec<String> = buffer.words().iter().map(ToString::to_string).collect();
    write_lines(path, &lines)?;
    info!("Wrote {} words to {}", lines.len(), path.display());
    Ok(())
}
