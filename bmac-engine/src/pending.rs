// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Deferred latch updates.
//!
//! A MAC result is not visible to reads until the following counter step.
//! Results are therefore pushed onto a [`DelayedWriteQueue`] and only applied
//! to the [`LatchArray`] when the queue is resolved.

use std::collections::VecDeque;

use log::trace;

use crate::bits::BitField;
use crate::latch::LatchArray;

/// Complete any pending updates.
pub trait Resolve {
    /// Apply every pending update, returning how many were applied.
    fn resolve(&mut self) -> usize;
}

/// A MAC result waiting to be committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    pub bank: usize,
    pub counter: usize,
    pub value: BitField,
}

impl PendingWrite {
    #[must_use]
    pub fn new(bank: usize, counter: usize, value: BitField) -> Self {
        Self {
            bank,
            counter,
            value,
        }
    }
}

/// Strict FIFO of [`PendingWrite`]s.
#[derive(Debug, Default)]
pub struct DelayedWriteQueue {
    pending: VecDeque<PendingWrite>,
}

impl DelayedWriteQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: PendingWrite) {
        self.pending.push_back(write);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Commit every queued write into `latch` in the order they were queued.
    ///
    /// Later writes to the same register win.
    pub fn drain_into(&mut self, latch: &mut LatchArray) -> usize {
        let count = self.pending.len();
        while let Some(write) = self.pending.pop_front() {
            trace!(
                "commit latch[{}][{}] = {:#x}",
                write.bank,
                write.counter,
                write.value.value()
            );
            latch.commit(&write);
        }
        count
    }
}
