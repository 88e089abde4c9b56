// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The accumulator latch array.
//!
//! One register of `acc_bits` bits per `(bank, counter)` pair. The array is
//! only ever updated by resolving a
//! [`DelayedWriteQueue`](crate::pending::DelayedWriteQueue), so a value
//! written during one counter iteration cannot be read back within it.

use crate::bits::BitField;
use crate::config::MacConfig;
use crate::pending::PendingWrite;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatchArray {
    banks: usize,
    counter_mod: usize,
    acc_bits: u32,
    entries: Vec<BitField>,
}

impl LatchArray {
    /// Create a zero-initialised array.
    #[must_use]
    pub fn new(banks: usize, counter_mod: usize, acc_bits: u32) -> Self {
        Self {
            banks,
            counter_mod,
            acc_bits,
            entries: vec![BitField::zero(acc_bits); banks * counter_mod],
        }
    }

    #[must_use]
    pub fn from_config(config: &MacConfig) -> Self {
        Self::new(config.banks, config.counter_mod, config.acc_bits)
    }

    #[must_use]
    pub fn banks(&self) -> usize {
        self.banks
    }

    #[must_use]
    pub fn counter_mod(&self) -> usize {
        self.counter_mod
    }

    #[must_use]
    pub fn acc_bits(&self) -> u32 {
        self.acc_bits
    }

    /// The committed value of one register.
    ///
    /// Panics if `bank` or `counter` is out of range.
    #[must_use]
    pub fn entry(&self, bank: usize, counter: usize) -> BitField {
        self.entries[self.index(bank, counter)]
    }

    /// All registers of one bank in counter order.
    #[must_use]
    pub fn bank(&self, bank: usize) -> &[BitField] {
        let start = bank * self.counter_mod;
        &self.entries[start..start + self.counter_mod]
    }

    pub(crate) fn commit(&mut self, write: &PendingWrite) {
        let index = self.index(write.bank, write.counter);
        self.entries[index] = write.value.truncate(self.acc_bits);
    }

    fn index(&self, bank: usize, counter: usize) -> usize {
        assert!(
            bank < self.banks && counter < self.counter_mod,
            "latch ({bank}, {counter}) outside {}x{} array",
            self.banks,
            self.counter_mod
        );
        bank * self.counter_mod + counter
    }
}
