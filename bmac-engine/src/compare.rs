// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Comparison of two latch dumps.
//!
//! Used to check the model output against the latch contents dumped from an
//! RTL simulation. Every mismatching register is reported by its
//! `(bank, counter)` coordinate.

use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::config::MacConfig;
use crate::types::{MacError, MacResult};

/// A register whose value differs between the two dumps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub bank: usize,
    pub counter: usize,
    pub expected: String,
    pub actual: String,
}

impl Mismatch {
    /// A `^` under every bit that differs.
    #[must_use]
    pub fn diff_marker(&self) -> String {
        self.expected
            .chars()
            .zip(self.actual.chars())
            .map(|(e, a)| if e == a { ' ' } else { '^' })
            .collect()
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Mismatch at bank {}, counter {}", self.bank, self.counter)?;
        writeln!(f, "  expected: {}", self.expected)?;
        writeln!(f, "  actual  : {}", self.actual)?;
        write!(f, "            {}", self.diff_marker())
    }
}

fn check_shape(name: &str, lines: &[String], config: &MacConfig) -> MacResult<()> {
    if lines.len() != config.banks {
        return Err(MacError::ShapeMismatch {
            context: format!("{name} line count"),
            expected: config.banks,
            actual: lines.len(),
        });
    }
    let line_bits = config.output_line_bits();
    for (bank, line) in lines.iter().enumerate() {
        if line.len() != line_bits {
            return Err(MacError::ShapeMismatch {
                context: format!("{name} bank {bank} width"),
                expected: line_bits,
                actual: line.len(),
            });
        }
        if let Some(column) = line.bytes().position(|c| c != b'0' && c != b'1') {
            return Err(MacError::malformed(
                format!("{name} bank {bank} column {column}"),
                "latch dumps may only contain 0 and 1",
            ));
        }
    }
    Ok(())
}

/// Compare two latch dumps register by register.
///
/// Both dumps must hold `banks` lines of `counter_mod * acc_bits` bits.
pub fn compare(
    expected: &[String],
    actual: &[String],
    config: &MacConfig,
) -> MacResult<Vec<Mismatch>> {
    if expected.len() != actual.len() {
        return Err(MacError::ShapeMismatch {
            context: "line count".to_string(),
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    check_shape("expected", expected, config)?;
    check_shape("actual", actual, config)?;

    let acc_bits = config.acc_bits as usize;
    let mismatches = expected
        .iter()
        .zip(actual)
        .enumerate()
        .flat_map(|(bank, (e, a))| {
            (0..config.counter_mod).filter_map(move |counter| {
                let span = counter * acc_bits..(counter + 1) * acc_bits;
                let (e, a) = (&e[span.clone()], &a[span]);
                (e != a).then(|| Mismatch {
                    bank,
                    counter,
                    expected: e.to_string(),
                    actual: a.to_string(),
                })
            })
        })
        .collect_vec();
    Ok(mismatches)
}

/// Read a latch dump, trimming each line and dropping trailing blank lines.
pub fn read_dump(path: &Path) -> MacResult<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| MacError::io(path, e))?;
    let mut lines = text.lines().map(|line| line.trim().to_string()).collect_vec();
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    Ok(lines)
}
