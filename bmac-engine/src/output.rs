// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Rendering of the final latch array.
//!
//! One line per bank, each the concatenation of that bank's registers in
//! increasing counter order, every register printed as zero-padded binary of
//! the latch width. This is the format dumped from the RTL waveforms.

use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::info;

use crate::latch::LatchArray;
use crate::types::{MacError, MacResult};

#[must_use]
pub fn render_bank(latch: &LatchArray, bank: usize) -> String {
    latch.bank(bank).iter().map(ToString::to_string).join("")
}

#[must_use]
pub fn render(latch: &LatchArray) -> Vec<String> {
    (0..latch.banks())
        .map(|bank| render_bank(latch, bank))
        .collect()
}

/// Write newline-terminated lines to `path`.
pub fn write_lines(path: &Path, lines: &[String]) -> MacResult<()> {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).map_err(|e| MacError::io(path, e))
}

/// Render `latch` and write it to `path`.
pub fn write_output(path: &Path, latch: &LatchArray) -> MacResult<()> {
    write_lines(path, &render(latch))?;
    info!("Wrote {} latch lines to {}", latch.banks(), path.display());
    Ok(())
}
