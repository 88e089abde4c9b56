// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[macro_export]
/// Build a [MacError::InvalidConfig] from a format string
macro_rules! config_error {
    ($($arg:tt)+) => {
        Err($crate::types::MacError::InvalidConfig(format!($($arg)+)))
    };
}

/// The `MacError` is what should be returned in the case of an error.
///
/// Every variant is fatal to the run that raised it.
#[derive(Debug)]
pub enum MacError {
    /// An SRAM line has the wrong width, contains something other than `0` or
    /// `1`, or a buffer holds too few lines.
    MalformedInput { context: String, reason: String },

    /// A value does not fit the bit width it is being encoded into.
    OutOfRange {
        context: String,
        value: i64,
        bits: u32,
    },

    /// Two buffers being compared do not have the same shape.
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A configuration parameter is zero, too wide or inconsistent.
    InvalidConfig(String),

    /// Failure reading or writing one of the SRAM/latch files.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MacError {
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        MacError::MalformedInput {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MacError::Io {
            path: path.into(),
            source,
        }
    }

    /// Prefix the location of the error with an outer scope, for example the
    /// buffer name and line of a field that failed to decode.
    #[must_use]
    pub fn within(self, outer: &str) -> Self {
        let nest = |context: String| {
            if context.is_empty() {
                outer.to_string()
            } else {
                format!("{outer}: {context}")
            }
        };
        match self {
            MacError::MalformedInput { context, reason } => MacError::MalformedInput {
                context: nest(context),
                reason,
            },
            MacError::OutOfRange {
                context,
                value,
                bits,
            } => MacError::OutOfRange {
                context: nest(context),
                value,
                bits,
            },
            MacError::ShapeMismatch {
                context,
                expected,
                actual,
            } => MacError::ShapeMismatch {
                context: nest(context),
                expected,
                actual,
            },
            other => other,
        }
    }
}

impl fmt::Display for MacError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MacError::MalformedInput { context, reason } => {
                write!(f, "Malformed input at {context}: {reason}")
            }
            MacError::OutOfRange {
                context,
                value,
                bits,
            } => {
                write!(f, "Value {value} at {context} does not fit in {bits} bits")
            }
            MacError::ShapeMismatch {
                context,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Shape mismatch at {context}: expected {expected}, found {actual}"
                )
            }
            MacError::InvalidConfig(msg) => {
                write!(f, "Invalid configuration: {msg}")
            }
            MacError::Io { path, source } => {
                write!(f, "Unable to access {}: {source}", path.display())
            }
        }
    }
}

impl Error for MacError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MacError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The MacResult is the return type for most simulation functions
pub type MacResult<T> = Result<T, MacError>;
