// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Run-time configuration of the MAC array.
//!
//! Every dimension of the array is an explicit parameter. The defaults match
//! the reference configuration of the hardware: 16 banks, 128 cycles, 16
//! accumulator slots per bank and 264-bit SRAM words holding 33 packed 8-bit
//! elements.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config_error;
use crate::kernel::VSQ_SCALAR_BITS;
use crate::types::MacResult;

/// Selects the accumulation kernel used for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    /// Inner product of the A and B element vectors.
    #[default]
    Direct,

    /// Shared-scalar vector-scale-quantization path.
    Vsq,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelKind::Direct => {
                write!(f, "direct")
            }
            KernelKind::Vsq => {
                write!(f, "vsq")
            }
        }
    }
}

/// How packed SRAM elements are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElementEncoding {
    /// Two's complement within the element width.
    #[default]
    Signed,

    /// Plain binary magnitude.
    Unsigned,
}

impl fmt::Display for ElementEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElementEncoding::Signed => {
                write!(f, "signed")
            }
            ElementEncoding::Unsigned => {
                write!(f, "unsigned")
            }
        }
    }
}

/// Configuration for one simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacConfig {
    /// Number of parallel banks (lanes) in the array.
    pub banks: usize,

    /// Number of outer cycles simulated.
    pub cycles: usize,

    /// Number of accumulator slots per bank.
    pub counter_mod: usize,

    /// Number of packed elements in one SRAM row.
    pub elements: usize,

    /// Width of one packed element.
    pub element_bits: u32,

    /// Width of one SRAM word.
    pub word_bits: usize,

    /// Width of one latch register.
    pub acc_bits: u32,

    pub kernel: KernelKind,
    pub encoding: ElementEncoding,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            banks: 16,
            cycles: 128,
            counter_mod: 16,
            elements: 33,
            element_bits: 8,
            word_bits: 264,
            acc_bits: 24,
            kernel: KernelKind::default(),
            encoding: ElementEncoding::default(),
        }
    }
}

impl MacConfig {
    /// Number of words each SRAM buffer must hold.
    #[must_use]
    pub fn words_per_buffer(&self) -> usize {
        self.banks * self.cycles
    }

    /// Width of one line of the latch dump.
    #[must_use]
    pub fn output_line_bits(&self) -> usize {
        self.counter_mod * self.acc_bits as usize
    }

    /// Check the parameters describe an array that can actually be simulated.
    pub fn validate(&self) -> MacResult<()> {
        for (name, value) in [
            ("banks", self.banks),
            ("cycles", self.cycles),
            ("counter_mod", self.counter_mod),
            ("elements", self.elements),
            ("word_bits", self.word_bits),
        ] {
            if value == 0 {
                return config_error!("{name} must be non-zero");
            }
        }

        if !(1..=32).contains(&self.element_bits) {
            return config_error!(
                "element_bits must be between 1 and 32, got {}",
                self.element_bits
            );
        }
        if !(1..=32).contains(&self.acc_bits) {
            return config_error!("acc_bits must be between 1 and 32, got {}", self.acc_bits);
        }

        match self.kernel {
            KernelKind::Direct => {
                // B rows are addressed as `cycle * banks + counter`
                if self.counter_mod > self.banks {
                    return config_error!(
                        "counter_mod ({}) cannot exceed banks ({})",
                        self.counter_mod,
                        self.banks
                    );
                }
                let row_bits = self.elements * self.element_bits as usize;
                if row_bits > self.word_bits {
                    return config_error!(
                        "{} elements of {} bits need {row_bits} bits but words are {} bits",
                        self.elements,
                        self.element_bits,
                        self.word_bits
                    );
                }
            }
            KernelKind::Vsq => {
                if VSQ_SCALAR_BITS as usize > self.word_bits {
                    return config_error!(
                        "VSQ scalar needs {VSQ_SCALAR_BITS} bits but words are {} bits",
                        self.word_bits
                    );
                }
            }
        }
        Ok(())
    }
}
