// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Golden-reference model of a banked, pipelined multiply-accumulate datapath.
//!
//! The model reads two SRAM images (`A` holds one row per bank, `B` one row per
//! counter), runs every `(cycle, counter)` step of the hardware schedule and
//! produces the final latch contents as fixed-width binary text. The output is
//! meant to be compared bit-for-bit against waveform dumps of the RTL.
//!
//! Accumulator writes issued while processing one counter only become visible
//! when the next counter starts. This one-step pipeline delay is modelled by a
//! [`DelayedWriteQueue`](pending::DelayedWriteQueue) that is drained before
//! every counter iteration and once more when the run completes.
//!
//! ```rust
//! use bmac_engine::config::MacConfig;
//! use bmac_engine::generate::{Pattern, generate};
//! use bmac_engine::output::render;
//! use bmac_engine::scheduler::simulate;
//!
//! let config = MacConfig {
//!     banks: 2,
//!     cycles: 1,
//!     counter_mod: 2,
//!     elements: 2,
//!     word_bits: 16,
//!     ..MacConfig::default()
//! };
//! let a = generate(&config, &Pattern::Constant(0)).unwrap();
//! let b = generate(&config, &Pattern::Constant(0)).unwrap();
//! let latch = simulate(&config, &a, &b).unwrap();
//! assert_eq!(render(&latch), vec!["0".repeat(48), "0".repeat(48)]);
//! ```

pub mod bits;
pub mod compare;
pub mod config;
pub mod generate;
pub mod kernel;
pub mod latch;
pub mod output;
pub mod pending;
pub mod scheduler;
pub mod sram;
pub mod test_helpers;
pub mod types;
