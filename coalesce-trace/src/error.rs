// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Errors raised while reading, writing or generating traces.

use std::error::Error;
use std::fmt;
use std::io;

use coalesce_engine::types::SourceId;

#[derive(Debug)]
pub enum TraceError {
    /// The underlying reader or writer failed.
    Io(io::Error),

    /// A record could not be parsed. `line` is 1-based.
    Malformed { line: usize, reason: String },

    /// The generator configuration cannot be used.
    Generator(String),

    /// A source id that cannot be stored as a single trace field.
    InvalidSource(SourceId),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TraceError::Io(e) => write!(f, "Error: {e}"),
            TraceError::Malformed { line, reason } => {
                write!(f, "Error: malformed record on line {line}: {reason}")
            }
            TraceError::Generator(msg) => write!(f, "Error: {msg}"),
            TraceError::InvalidSource(id) => write!(
                f,
                "Error: source '{id}' cannot be written as a trace field"
            ),
        }
    }
}

impl Error for TraceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TraceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        TraceError::Io(e)
    }
}

pub type TraceResult<T> = Result<T, TraceError>;
