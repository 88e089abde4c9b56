// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Fixed-width register values and the bit-field codec.
//!
//! A [`BitField`] carries its width with it, so every arithmetic operation
//! wraps exactly as a hardware register of that width would. The codec
//! functions convert between signed integers and the binary-string form used
//! by the SRAM images.

use std::fmt;

use crate::config::ElementEncoding;
use crate::sram::SramWord;
use crate::types::{MacError, MacResult};

/// Widest field the codec can encode or decode.
pub const MAX_FIELD_BITS: u32 = u64::BITS;

/// All-ones mask of `width` bits.
#[must_use]
pub const fn mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// An unsigned value held in a register of `width` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitField {
    value: u64,
    width: u32,
}

impl BitField {
    /// Create a field, discarding any bits of `value` above `width`.
    #[must_use]
    pub fn new(value: u64, width: u32) -> Self {
        Self {
            value: value & mask(width),
            width,
        }
    }

    #[must_use]
    pub fn zero(width: u32) -> Self {
        Self { value: 0, width }
    }

    /// Encode a signed value as two's complement.
    ///
    /// Fails if `value` is outside `[-2^(width-1), 2^(width-1))` or `width` is
    /// not in `1..=MAX_FIELD_BITS`.
    pub fn from_signed(value: i64, width: u32) -> MacResult<Self> {
        let fits = match width {
            1..=63 => {
                let half = 1i64 << (width - 1);
                (-half..half).contains(&value)
            }
            MAX_FIELD_BITS => true,
            _ => false,
        };
        if !fits {
            return Err(MacError::OutOfRange {
                context: String::new(),
                value,
                bits: width,
            });
        }
        Ok(Self::new(value as u64, width))
    }

    /// Encode a non-negative value.
    ///
    /// Fails if `value` is negative or does not fit in `width` bits.
    pub fn from_unsigned(value: i64, width: u32) -> MacResult<Self> {
        if !(1..=MAX_FIELD_BITS).contains(&width) || value < 0 || (value as u64) > mask(width) {
            return Err(MacError::OutOfRange {
                context: String::new(),
                value,
                bits: width,
            });
        }
        Ok(Self::new(value as u64, width))
    }

    pub fn encode(value: i64, width: u32, encoding: ElementEncoding) -> MacResult<Self> {
        match encoding {
            ElementEncoding::Signed => Self::from_signed(value, width),
            ElementEncoding::Unsigned => Self::from_unsigned(value, width),
        }
    }

    #[must_use]
    pub fn decode(&self, encoding: ElementEncoding) -> i64 {
        match encoding {
            ElementEncoding::Signed => self.to_signed(),
            ElementEncoding::Unsigned => self.value as i64,
        }
    }

    /// Sign-extend the field.
    #[must_use]
    pub fn to_signed(&self) -> i64 {
        if self.width == 0 || self.width >= u64::BITS {
            return self.value as i64;
        }
        let shift = u64::BITS - self.width;
        ((self.value << shift) as i64) >> shift
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Add modulo `2^width`.
    #[must_use]
    pub fn wrapping_add(self, rhs: u64) -> Self {
        Self::new(self.value.wrapping_add(rhs), self.width)
    }

    /// Add a signed amount modulo `2^width`.
    #[must_use]
    pub fn wrapping_add_signed(self, rhs: i64) -> Self {
        Self::new(self.value.wrapping_add_signed(rhs), self.width)
    }

    /// Multiply modulo `2^width`.
    #[must_use]
    pub fn wrapping_mul(self, rhs: u64) -> Self {
        Self::new(self.value.wrapping_mul(rhs), self.width)
    }

    /// Keep the low `width` bits in a register of that width.
    #[must_use]
    pub fn truncate(self, width: u32) -> Self {
        Self::new(self.value, width)
    }
}

/// Zero-padded binary, most significant bit first.
impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.width as usize)
    }
}

/// Pack two's-complement values into a binary string of
/// `values.len() * bits_per_value` bits.
pub fn pack(values: &[i64], bits_per_value: u32) -> MacResult<String> {
    pack_with(values, bits_per_value, ElementEncoding::Signed)
}

pub fn pack_with(
    values: &[i64],
    bits_per_value: u32,
    encoding: ElementEncoding,
) -> MacResult<String> {
    let mut packed = String::with_capacity(values.len() * bits_per_value as usize);
    for (index, value) in values.iter().enumerate() {
        let field = BitField::encode(*value, bits_per_value, encoding)
            .map_err(|e| e.within(&format!("element {index}")))?;
        packed.push_str(&field.to_string());
    }
    Ok(packed)
}

/// Unpack the first `count` two's-complement values of a binary string.
///
/// Trailing bits beyond `count * bits_per_value` are ignored.
pub fn unpack(bits: &str, bits_per_value: u32, count: usize) -> MacResult<Vec<i64>> {
    unpack_with(bits, bits_per_value, count, ElementEncoding::Signed)
}

pub fn unpack_with(
    bits: &str,
    bits_per_value: u32,
    count: usize,
    encoding: ElementEncoding,
) -> MacResult<Vec<i64>> {
    if !(1..=MAX_FIELD_BITS).contains(&bits_per_value) {
        return Err(MacError::malformed(
            "field width",
            format!("{bits_per_value} bits is outside 1..={MAX_FIELD_BITS}"),
        ));
    }
    let word: SramWord = bits.parse()?;
    word.fields(bits_per_value, count, encoding)
}
