// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Front-end to the bank-MAC reference model.
//!
//! The settings are gathered from defaults, an optional TOML file, `BMAC_*`
//! environment variables and the command line (see [`bmac_config`]) and then
//! one of three commands is run:
//!
//!  - `generate` writes A and B SRAM images,
//!  - `simulate` runs the model over two images and writes the latch dump,
//!  - `compare` checks two latch dumps register by register.

use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use bmac_config::{ConfigError, MultiSourceConfig, multi_source_config};
use bmac_engine::compare::{compare, read_dump};
use bmac_engine::config::{ElementEncoding, KernelKind, MacConfig};
use bmac_engine::generate::{Pattern, generate, write_buffer};
use bmac_engine::output::write_output;
use bmac_engine::scheduler::simulate;
use bmac_engine::sram::SramBuffer;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use simplelog::{ConfigBuilder, SimpleLogger};

/// Which generator fills the A and B images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PatternKind {
    Random,
    Linear,
    Constant,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Write A and B SRAM images
    Generate {
        /// Output file for the A image
        #[arg(long, default_value = "a_sram_binary.txt")]
        a_out: PathBuf,

        /// Output file for the B image
        #[arg(long, default_value = "b_sram_binary.txt")]
        b_out: PathBuf,

        #[arg(long, value_enum, default_value_t = PatternKind::Random)]
        pattern: PatternKind,

        /// Seed of the A image; B uses the next seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Element value of the constant pattern
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        value: i64,
    },

    /// Run the model over A and B and write the latch dump
    Simulate {
        #[arg(long, default_value = "a_sram_binary.txt")]
        a_file: PathBuf,

        #[arg(long, default_value = "b_sram_binary.txt")]
        b_file: PathBuf,

        #[arg(long, default_value = "output_sram_binary.txt")]
        out_file: PathBuf,
    },

    /// Compare two latch dumps and report every register that differs
    Compare {
        /// Dump produced by the reference model
        #[arg(long, default_value = "output_sram_binary.txt")]
        expected: PathBuf,

        /// Dump under test (e.g. from an RTL simulation)
        #[arg(long, default_value = "latch_array_output.txt")]
        actual: PathBuf,
    },
}

/// Command-line arguments.
#[derive(Debug, Parser, Serialize, Deserialize)]
#[command(name = "bmac", version, about = "Bank-MAC reference model")]
pub struct Settings {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Number of parallel banks
    #[arg(long, global = true)]
    pub banks: Option<usize>,

    /// Number of cycles simulated
    #[arg(long, global = true)]
    pub cycles: Option<usize>,

    /// Number of accumulator slots per bank
    #[arg(long, global = true)]
    pub counter_mod: Option<usize>,

    /// Number of packed elements per SRAM word
    #[arg(long, global = true)]
    pub elements: Option<usize>,

    /// Width of each packed element
    #[arg(long, global = true)]
    pub element_bits: Option<u32>,

    /// Width of each SRAM word
    #[arg(long, global = true)]
    pub word_bits: Option<usize>,

    /// Width of each latch register
    #[arg(long, global = true)]
    pub acc_bits: Option<u32>,

    #[arg(long, global = true, value_enum)]
    pub kernel: Option<KernelKind>,

    #[arg(long, global = true, value_enum)]
    pub encoding: Option<ElementEncoding>,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    #[serde(skip)]
    pub conf_file: Option<PathBuf>,

    #[command(subcommand)]
    #[serde(skip)]
    pub command: Option<Command>,
}

impl Default for Settings {
    fn default() -> Self {
        let config = MacConfig::default();
        Self {
            log: Some("info".to_string()),
            banks: Some(config.banks),
            cycles: Some(config.cycles),
            counter_mod: Some(config.counter_mod),
            elements: Some(config.elements),
            element_bits: Some(config.element_bits),
            word_bits: Some(config.word_bits),
            acc_bits: Some(config.acc_bits),
            kernel: Some(config.kernel),
            encoding: Some(config.encoding),
            conf_file: None,
            command: None,
        }
    }
}

multi_source_config!(Settings ; conf_file ;
    log, banks, cycles, counter_mod, elements, element_bits, word_bits, acc_bits,
    kernel, encoding, command);

impl Settings {
    /// The model configuration, with defaults for anything left unset.
    #[must_use]
    pub fn mac_config(&self) -> MacConfig {
        let defaults = MacConfig::default();
        MacConfig {
            banks: self.banks.unwrap_or(defaults.banks),
            cycles: self.cycles.unwrap_or(defaults.cycles),
            counter_mod: self.counter_mod.unwrap_or(defaults.counter_mod),
            elements: self.elements.unwrap_or(defaults.elements),
            element_bits: self.element_bits.unwrap_or(defaults.element_bits),
            word_bits: self.word_bits.unwrap_or(defaults.word_bits),
            acc_bits: self.acc_bits.unwrap_or(defaults.acc_bits),
            kernel: self.kernel.unwrap_or(defaults.kernel),
            encoding: self.encoding.unwrap_or(defaults.encoding),
        }
    }
}

/// Gather the settings from every source.
///
/// Usage errors, `--help` and `--version` print their message and exit the
/// process.
pub fn load_settings<I, T>(args: I) -> Result<Settings>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Settings::parse_sources_from(args) {
        Ok(settings) => Ok(settings),
        Err(ConfigError::Clap(e)) => e.exit(),
        Err(e) => Err(e).wrap_err("failed to read configuration"),
    }
}

fn choose_level(lvl: &str) -> LevelFilter {
    match LevelFilter::from_str(lvl) {
        Ok(level) => level,
        Err(_) => {
            let default = LevelFilter::Error;
            eprintln!("Unable to parse level string '{lvl}', defaulting to {default}");
            default
        }
    }
}

/// Install a terse logger writing to stdout/stderr.
pub fn setup_logger(lvl: &str) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    SimpleLogger::init(choose_level(lvl), config).wrap_err("failed to install logger")?;
    Ok(())
}

fn patterns(kind: PatternKind, seed: u64, value: i64) -> (Pattern, Pattern) {
    match kind {
        PatternKind::Random => (
            Pattern::Random { seed },
            Pattern::Random {
                seed: seed.wrapping_add(1),
            },
        ),
        PatternKind::Linear => (Pattern::Linear, Pattern::Linear),
        PatternKind::Constant => (Pattern::Constant(value), Pattern::Constant(value)),
    }
}

/// Execute the command held in `settings`.
pub fn run(settings: &Settings) -> Result<()> {
    let config = settings.mac_config();
    config.validate().wrap_err("invalid configuration")?;

    match &settings.command {
        Some(Command::Generate {
            a_out,
            b_out,
            pattern,
            seed,
            value,
        }) => {
            let (a_pattern, b_pattern) = patterns(*pattern, *seed, *value);
            for (path, pattern) in [(a_out, a_pattern), (b_out, b_pattern)] {
                let buffer = generate(&config, &pattern)?;
                write_buffer(path, &buffer)
                    .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            }
        }
        Some(Command::Simulate {
            a_file,
            b_file,
            out_file,
        }) => {
            let a = SramBuffer::from_file(a_file, &config)?;
            let b = SramBuffer::from_file(b_file, &config)?;
            let latch = simulate(&config, &a, &b)?;
            write_output(out_file, &latch)
                .wrap_err_with(|| format!("failed to write {}", out_file.display()))?;
        }
        Some(Command::Compare { expected, actual }) => {
            let expected_lines = read_dump(expected)?;
            let actual_lines = read_dump(actual)?;
            let mismatches = compare(&expected_lines, &actual_lines, &config).wrap_err_with(
                || {
                    format!(
                        "cannot compare {} with {}",
                        expected.display(),
                        actual.display()
                    )
                },
            )?;

            let registers = config.banks * config.counter_mod;
            if !mismatches.is_empty() {
                for mismatch in &mismatches {
                    println!("{mismatch}");
                }
                bail!("{} of {registers} registers differ", mismatches.len());
            }
            info!("All {registers} registers match");
        }
        None => bail!("no command given, see --help"),
    }
    Ok(())
}
