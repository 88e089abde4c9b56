// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The MAC scheduler.
//!
//! Walks every `(cycle, counter)` step of the hardware schedule in order:
//!
//!  - at the start of a cycle the A row of every bank is loaded and kept for
//!    all counters of that cycle (weight-stationary);
//!  - at the start of every counter the pending writes of the previous
//!    counter are committed, then every bank reads `latch[bank][counter]`,
//!    runs the kernel and queues its result;
//!  - after the last cycle one final drain commits the last results.
//!
//! All banks of one counter step therefore see the same latch snapshot, as a
//! synchronously clocked register bank would.

use std::fmt;

use log::{debug, info, trace};

use crate::config::MacConfig;
use crate::kernel::{BOperand, MacKernel};
use crate::latch::LatchArray;
use crate::pending::{DelayedWriteQueue, PendingWrite, Resolve};
use crate::sram::SramBuffer;
use crate::types::{MacError, MacResult};

/// Where the scheduler is in the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The A rows of this cycle have not been loaded yet.
    AwaitCycle(usize),

    /// The next step processes this counter.
    AwaitCounter { cycle: usize, counter: usize },

    /// Every step has been processed. Writes from the last step may still be
    /// pending.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Phase::AwaitCycle(cycle) => write!(f, "cycle {cycle}"),
            Phase::AwaitCounter { cycle, counter } => {
                write!(f, "cycle {cycle} counter {counter}")
            }
            Phase::Done => write!(f, "done"),
        }
    }
}

/// The state owned by one run: the latch array and its pending writes.
#[derive(Debug)]
pub struct MacContext {
    latch: LatchArray,
    queue: DelayedWriteQueue,
}

impl MacContext {
    #[must_use]
    pub fn new(config: &MacConfig) -> Self {
        Self {
            latch: LatchArray::from_config(config),
            queue: DelayedWriteQueue::new(),
        }
    }

    #[must_use]
    pub fn latch(&self) -> &LatchArray {
        &self.latch
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn defer(&mut self, write: PendingWrite) {
        self.queue.push(write);
    }

    #[must_use]
    pub fn into_latch(self) -> LatchArray {
        self.latch
    }
}

impl Resolve for MacContext {
    fn resolve(&mut self) -> usize {
        self.queue.drain_into(&mut self.latch)
    }
}

pub struct MacScheduler<'a> {
    config: MacConfig,
    kernel: Box<dyn MacKernel + 'a>,
    a: &'a SramBuffer,
    b: &'a SramBuffer,
    context: MacContext,
    phase: Phase,

    /// Decoded A rows of the current cycle, indexed by bank.
    a_rows: Vec<Vec<i64>>,

    /// Decoded B row of the current cycle for kernels that share one.
    shared_b: Option<Vec<i64>>,
}

impl<'a> MacScheduler<'a> {
    /// Create a scheduler running the kernel selected by `config.kernel`.
    pub fn new(config: &MacConfig, a: &'a SramBuffer, b: &'a SramBuffer) -> MacResult<Self> {
        Self::with_kernel(config, config.kernel.build(config), a, b)
    }

    /// Create a scheduler running an explicit kernel.
    pub fn with_kernel(
        config: &MacConfig,
        kernel: Box<dyn MacKernel + 'a>,
        a: &'a SramBuffer,
        b: &'a SramBuffer,
    ) -> MacResult<Self> {
        config.validate()?;
        for buffer in [a, b] {
            check_buffer(config, buffer)?;
        }

        Ok(Self {
            config: config.clone(),
            kernel,
            a,
            b,
            context: MacContext::new(config),
            phase: Phase::AwaitCycle(0),
            a_rows: Vec::with_capacity(config.banks),
            shared_b: None,
        })
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of writes not yet committed to the latch array.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.context.pending()
    }

    /// The committed latch state.
    #[must_use]
    pub fn latch(&self) -> &LatchArray {
        self.context.latch()
    }

    /// Process one counter iteration, loading the A rows first if this is
    /// the first counter of a cycle.
    pub fn step(&mut self) -> MacResult<Phase> {
        let (cycle, counter) = match self.phase {
            Phase::Done => return Ok(Phase::Done),
            Phase::AwaitCycle(cycle) => {
                self.load_cycle(cycle)?;
                (cycle, 0)
            }
            Phase::AwaitCounter { cycle, counter } => (cycle, counter),
        };

        self.process_counter(cycle, counter)?;

        self.phase = if counter + 1 < self.config.counter_mod {
            Phase::AwaitCounter {
                cycle,
                counter: counter + 1,
            }
        } else if cycle + 1 < self.config.cycles {
            Phase::AwaitCycle(cycle + 1)
        } else {
            Phase::Done
        };
        Ok(self.phase)
    }

    /// Run any remaining steps and flush the last batch of pending writes.
    pub fn finish(&mut self) -> MacResult<&LatchArray> {
        while self.step()? != Phase::Done {}
        let flushed = self.context.resolve();
        trace!("final drain committed {flushed} writes");
        Ok(self.context.latch())
    }

    #[must_use]
    pub fn into_latch(self) -> LatchArray {
        self.context.into_latch()
    }

    fn load_cycle(&mut self, cycle: usize) -> MacResult<()> {
        let banks = self.config.banks;
        self.a_rows.clear();
        for bank in 0..banks {
            let row = self.decode(self.a, cycle, bank)?;
            self.a_rows.push(row);
        }

        self.shared_b = match self.kernel.b_operand() {
            BOperand::SharedPerCycle => Some(self.decode(self.b, cycle, 0)?),
            BOperand::PerCounter => None,
        };

        debug!("cycle {cycle}: loaded {banks} A rows");
        Ok(())
    }

    fn process_counter(&mut self, cycle: usize, counter: usize) -> MacResult<()> {
        // Writes issued for the previous counter become visible now
        let committed = self.context.resolve();
        trace!("cycle {cycle} counter {counter}: committed {committed} writes");

        let per_counter_b;
        let b_row = match &self.shared_b {
            Some(row) => row,
            None => {
                per_counter_b = self.decode(self.b, cycle, counter)?;
                &per_counter_b
            }
        };

        for (bank, a_row) in self.a_rows.iter().enumerate() {
            let acc = self.context.latch().entry(bank, counter);
            let result = self.kernel.accumulate(acc, a_row, b_row);
            self.context
                .defer(PendingWrite::new(bank, counter, result.truncate(self.config.acc_bits)));
        }
        Ok(())
    }

    fn decode(&self, buffer: &SramBuffer, cycle: usize, lane: usize) -> MacResult<Vec<i64>> {
        let banks = self.config.banks;
        buffer
            .row(cycle, lane, banks)
            .and_then(|word| self.kernel.decode_row(word))
            .map_err(|e| e.within(&buffer.describe_row(cycle, lane, banks)))
    }
}

fn check_buffer(config: &MacConfig, buffer: &SramBuffer) -> MacResult<()> {
    if buffer.word_bits() != config.word_bits {
        return Err(MacError::malformed(
            buffer.name(),
            format!(
                "buffer holds {}-bit words but the run expects {}",
                buffer.word_bits(),
                config.word_bits
            ),
        ));
    }
    if buffer.len() < config.words_per_buffer() {
        return Err(MacError::malformed(
            buffer.name(),
            format!(
                "{} words present but the run needs {}",
                buffer.len(),
                config.words_per_buffer()
            ),
        ));
    }
    Ok(())
}

/// Run a complete simulation with the kernel selected by `config`.
pub fn simulate(config: &MacConfig, a: &SramBuffer, b: &SramBuffer) -> MacResult<LatchArray> {
    info!(
        "Simulating {} cycles x {} counters over {} banks with the {} kernel",
        config.cycles, config.counter_mod, config.banks, config.kernel
    );
    let mut scheduler = MacScheduler::new(config, a, b)?;
    scheduler.finish()?;
    info!("Simulation complete");
    Ok(scheduler.into_latch())
}
