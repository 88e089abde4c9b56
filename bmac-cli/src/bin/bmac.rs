// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! # Bank-MAC Reference Model
//!
//! `bmac` generates SRAM test vectors, runs the cycle-level model over them
//! and compares latch dumps against a design under test.

use bmac_cli::{load_settings, run, setup_logger};
use color_eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let settings = load_settings(std::env::args_os())?;
    setup_logger(settings.log.as_deref().unwrap_or("info"))?;
    run(&settings)
}
