// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! SRAM words and buffers.
//!
//! An SRAM image is a text file with one binary word per line. Word `i` of a
//! buffer is the row read by lane `i % banks` during cycle `i / banks`.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use log::{debug, warn};

use crate::bits::BitField;
use crate::config::{ElementEncoding, MacConfig};
use crate::types::{MacError, MacResult};

const LIMB_BITS: usize = u64::BITS as usize;

/// A fixed-width SRAM word.
///
/// Bit 0 is the left-most character of the textual form and is the most
/// significant bit of the first packed field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SramWord {
    width: usize,
    limbs: Vec<u64>,
}

impl SramWord {
    #[must_use]
    pub fn zeros(width: usize) -> Self {
        Self {
            width,
            limbs: vec![0; width.div_ceil(LIMB_BITS)],
        }
    }

    /// Build a word from its bits, left-most first.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let bits = bits.into_iter().collect_vec();
        let mut word = Self::zeros(bits.len());
        for (index, bit) in bits.into_iter().enumerate() {
            word.set_bit(index, bit);
        }
        word
    }

    /// Pack `values` from bit 0 and pad with zeros up to `width` bits.
    pub fn from_fields(
        values: &[i64],
        bits_per_value: u32,
        encoding: ElementEncoding,
        width: usize,
    ) -> MacResult<Self> {
        let mut word = Self::zeros(width);
        for (index, value) in values.iter().enumerate() {
            let field = BitField::encode(*value, bits_per_value, encoding)
                .map_err(|e| e.within(&format!("element {index}")))?;
            word.set_field(index * bits_per_value as usize, field)?;
        }
        Ok(word)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Panics if `index` is beyond the width of the word.
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.width, "bit {index} of {}-bit word", self.width);
        let shift = LIMB_BITS - 1 - index % LIMB_BITS;
        (self.limbs[index / LIMB_BITS] >> shift) & 1 == 1
    }

    fn set_bit(&mut self, index: usize, bit: bool) {
        let shift = LIMB_BITS - 1 - index % LIMB_BITS;
        let limb = &mut self.limbs[index / LIMB_BITS];
        if bit {
            *limb |= 1 << shift;
        } else {
            *limb &= !(1 << shift);
        }
    }

    fn check_span(&self, offset: usize, bits: u32) -> MacResult<()> {
        let end = offset + bits as usize;
        if bits as usize > LIMB_BITS || end > self.width {
            return Err(MacError::malformed(
                format!("bits {offset}..{end}"),
                format!("field does not fit a {}-bit word", self.width),
            ));
        }
        Ok(())
    }

    /// Read `bits` bits starting at bit `offset`.
    pub fn field(&self, offset: usize, bits: u32) -> MacResult<BitField> {
        self.check_span(offset, bits)?;
        let value = (offset..offset + bits as usize)
            .fold(0u64, |acc, index| (acc << 1) | u64::from(self.bit(index)));
        Ok(BitField::new(value, bits))
    }

    /// Overwrite the bits starting at `offset` with `field`.
    pub fn set_field(&mut self, offset: usize, field: BitField) -> MacResult<()> {
        self.check_span(offset, field.width())?;
        let width = field.width() as usize;
        for i in 0..width {
            let bit = (field.value() >> (width - 1 - i)) & 1 == 1;
            self.set_bit(offset + i, bit);
        }
        Ok(())
    }

    /// Decode the first `count` packed fields of `bits_per_value` bits each.
    pub fn fields(
        &self,
        bits_per_value: u32,
        count: usize,
        encoding: ElementEncoding,
    ) -> MacResult<Vec<i64>> {
        (0..count)
            .map(|index| {
                self.field(index * bits_per_value as usize, bits_per_value)
                    .map(|field| field.decode(encoding))
            })
            .collect()
    }
}

impl FromStr for SramWord {
    type Err = MacError;

    fn from_str(text: &str) -> MacResult<Self> {
        let mut word = Self::zeros(text.len());
        for (index, c) in text.bytes().enumerate() {
            match c {
                b'0' => {}
                b'1' => word.set_bit(index, true),
                _ => {
                    return Err(MacError::malformed(
                        format!("column {index}"),
                        format!("unexpected character {:?}", c as char),
                    ));
                }
            }
        }
        Ok(word)
    }
}

impl fmt::Display for SramWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for index in 0..self.width {
            f.write_str(if self.bit(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// The contents of one SRAM image, read-only during a simulation.
#[derive(Clone, Debug)]
pub struct SramBuffer {
    name: String,
    word_bits: usize,
    words: Vec<SramWord>,
}

impl SramBuffer {
    /// Wrap `words`, checking that every word is `word_bits` wide and that
    /// there are enough words to feed every cycle of the run.
    pub fn new(name: &str, words: Vec<SramWord>, config: &MacConfig) -> MacResult<Self> {
        for (index, word) in words.iter().enumerate() {
            if word.width() != config.word_bits {
                return Err(MacError::malformed(
                    format!("{name} line {}", index + 1),
                    format!(
                        "word is {} bits wide, expected {}",
                        word.width(),
                        config.word_bits
                    ),
                ));
            }
        }

        let required = config.words_per_buffer();
        if words.len() < required {
            return Err(MacError::malformed(
                name.to_string(),
                format!(
                    "{} words present but {} banks x {} cycles need {required}",
                    words.len(),
                    config.banks,
                    config.cycles
                ),
            ));
        }
        if words.len() > required {
            warn!(
                "{name}: ignoring {} words beyond the {required} used by the run",
                words.len() - required
            );
        }

        Ok(Self {
            name: name.to_string(),
            word_bits: config.word_bits,
            words,
        })
    }

    /// Parse newline-separated binary words. Surrounding whitespace on each
    /// line and trailing blank lines are ignored.
    pub fn parse(name: &str, text: &str, config: &MacConfig) -> MacResult<Self> {
        let mut lines = text.lines().map(str::trim).collect_vec();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        let words = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                line.parse::<SramWord>()
                    .map_err(|e| e.within(&format!("{name} line {}", index + 1)))
            })
            .collect::<MacResult<Vec<_>>>()?;
        Self::new(name, words, config)
    }

    pub fn from_file(path: &Path, config: &MacConfig) -> MacResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| MacError::io(path, e))?;
        let buffer = Self::parse(&path.display().to_string(), &text, config)?;
        debug!("Read {} words from {}", buffer.len(), path.display());
        Ok(buffer)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn word_bits(&self) -> usize {
        self.word_bits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn words(&self) -> &[SramWord] {
        &self.words
    }

    /// The word at `cycle * banks + lane`.
    pub fn row(&self, cycle: usize, lane: usize, banks: usize) -> MacResult<&SramWord> {
        let index = cycle * banks + lane;
        self.words.get(index).ok_or_else(|| {
            MacError::malformed(
                format!("{} cycle {cycle} lane {lane}", self.name),
                format!("line {} beyond the {} words present", index + 1, self.len()),
            )
        })
    }

    /// Location of a row, used to report decode failures.
    #[must_use]
    pub fn describe_row(&self, cycle: usize, lane: usize, banks: usize) -> String {
        format!(
            "{} line {} (cycle {cycle}, lane {lane})",
            self.name,
            cycle * banks + lane + 1
        )
    }
}
