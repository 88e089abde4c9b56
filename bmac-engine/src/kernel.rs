// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Accumulation kernels.
//!
//! A kernel turns the current latch value, one decoded A row (owned by the
//! bank) and one decoded B row (shared by every bank) into the next latch
//! value. The scheduler is written against the [`MacKernel`] trait only; the
//! kernel for a run is chosen from [`KernelKind`].

use crate::bits::BitField;
use crate::config::{ElementEncoding, KernelKind, MacConfig};
use crate::sram::SramWord;
use crate::types::MacResult;

/// Width of the scalar coefficient at the start of each VSQ row.
pub const VSQ_SCALAR_BITS: u32 = 8;

/// Width the VSQ coefficient product is truncated to.
pub const VSQ_PRODUCT_BITS: u32 = 8;

/// Width the `acc * product` term is truncated to before being added back to
/// the accumulator. This is narrower than the 24-bit latch in the hardware.
pub const VSQ_SCALED_BITS: u32 = 22;

/// Which B row a kernel consumes for a given counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BOperand {
    /// Row `cycle * banks + counter`.
    PerCounter,

    /// Row `cycle * banks`, shared by every counter of the cycle.
    SharedPerCycle,
}

pub trait MacKernel {
    fn name(&self) -> &'static str;

    fn b_operand(&self) -> BOperand {
        BOperand::PerCounter
    }

    /// Extract the operands this kernel uses from an SRAM row.
    fn decode_row(&self, word: &SramWord) -> MacResult<Vec<i64>>;

    /// Compute the next latch value.
    ///
    /// The result keeps the width of `acc`.
    fn accumulate(&self, acc: BitField, a: &[i64], b: &[i64]) -> BitField;
}

/// `acc + sum(a[i] * b[i])`, wrapped to the latch width.
pub struct DirectDot {
    elements: usize,
    element_bits: u32,
    encoding: ElementEncoding,
}

impl DirectDot {
    #[must_use]
    pub fn new(elements: usize, element_bits: u32, encoding: ElementEncoding) -> Self {
        Self {
            elements,
            element_bits,
            encoding,
        }
    }
}

impl MacKernel for DirectDot {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn decode_row(&self, word: &SramWord) -> MacResult<Vec<i64>> {
        word.fields(self.element_bits, self.elements, self.encoding)
    }

    fn accumulate(&self, acc: BitField, a: &[i64], b: &[i64]) -> BitField {
        // Wrapping is exact here: the sum is only observed modulo 2^acc_bits
        let dot = a
            .iter()
            .zip(b)
            .fold(0i64, |sum, (x, y)| sum.wrapping_add(x.wrapping_mul(*y)));
        acc.wrapping_add_signed(dot)
    }
}

/// Shared-scalar path:
///
/// ```text
/// product = (a_scalar * b_scalar) mod 2^8
/// scaled  = (acc * product)       mod 2^22
/// result  = (acc + scaled)        mod 2^acc_bits
/// ```
///
/// Only the leading [`VSQ_SCALAR_BITS`] of each row are read. Because the
/// product is truncated to 8 bits, the result is the same whether the
/// scalars are decoded signed or unsigned.
pub struct Vsq {
    encoding: ElementEncoding,
}

impl Vsq {
    #[must_use]
    pub fn new(encoding: ElementEncoding) -> Self {
        Self { encoding }
    }
}

impl MacKernel for Vsq {
    fn name(&self) -> &'static str {
        "vsq"
    }

    fn b_operand(&self) -> BOperand {
        BOperand::SharedPerCycle
    }

    fn decode_row(&self, word: &SramWord) -> MacResult<Vec<i64>> {
        word.fields(VSQ_SCALAR_BITS, 1, self.encoding)
    }

    fn accumulate(&self, acc: BitField, a: &[i64], b: &[i64]) -> BitField {
        let product = BitField::new(a[0].wrapping_mul(b[0]) as u64, VSQ_PRODUCT_BITS);
        let scaled = acc.truncate(VSQ_SCALED_BITS).wrapping_mul(product.value());
        acc.wrapping_add(scaled.value())
    }
}

impl KernelKind {
    /// Build the kernel selected by `config`.
    #[must_use]
    pub fn build(&self, config: &MacConfig) -> Box<dyn MacKernel> {
        match self {
            KernelKind::Direct => Box::new(DirectDot::new(
                config.elements,
                config.element_bits,
                config.encoding,
            )),
            KernelKind::Vsq => Box::new(Vsq::new(config.encoding)),
        }
    }
}
