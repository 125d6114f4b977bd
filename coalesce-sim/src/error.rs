// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Errors which stop the application.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use coalesce_engine::engine::RunAborted;
use coalesce_engine::types::SimError;
use coalesce_trace::error::TraceError;
use coalesce_track::tracker::TrackConfigError;

pub enum AppError {
    /// The configuration sources could not be merged or extracted.
    Config(Box<figment::Error>),

    /// A configuration file named on the command line does not exist.
    MissingConfig(PathBuf),

    Trace(TraceError),
    Sim(SimError),
    Aborted(RunAborted),
    Track(TrackConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Error: invalid configuration: {e}"),
            AppError::MissingConfig(path) => {
                write!(f, "Error: configuration file {} not found", path.display())
            }
            AppError::Trace(e) => write!(f, "{e}"),
            AppError::Sim(e) => write!(f, "{e}"),
            AppError::Aborted(e) => write!(f, "{e}"),
            AppError::Track(e) => write!(f, "{e}"),
        }
    }
}

// `main` reports errors using `Debug`
impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e.as_ref()),
            AppError::MissingConfig(_) => None,
            AppError::Trace(e) => Some(e),
            AppError::Sim(e) => Some(e),
            AppError::Aborted(e) => Some(e),
            AppError::Track(e) => Some(e),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(Box::new(e))
    }
}

impl From<TraceError> for AppError {
    fn from(e: TraceError) -> Self {
        AppError::Trace(e)
    }
}

impl From<SimError> for AppError {
    fn from(e: SimError) -> Self {
        AppError::Sim(e)
    }
}

impl From<RunAborted> for AppError {
    fn from(e: RunAborted) -> Self {
        AppError::Aborted(e)
    }
}

impl From<TrackConfigError> for AppError {
    fn from(e: TrackConfigError) -> Self {
        AppError::Track(e)
    }
}
