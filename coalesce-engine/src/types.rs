// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical simulation time.
///
/// Time is an integer counter that is only ever advanced by the timestamps of
/// arriving packets.
pub type Time = u64;

/// The identifier of the origin of a packet.
///
/// A buffering policy is attached to each source in the
/// [`RoutingTable`](crate::routing::RoutingTable).
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be stored as one field of a comma-separated trace
    /// record and read back unchanged.
    ///
    /// The id must be non-empty, must not contain a comma or a line break and
    /// must not start or end with whitespace.
    #[must_use]
    pub fn is_field_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0.trim() == self.0
            && !self.0.contains([',', '\n', '\r'])
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// Simulation errors

#[macro_export]
/// Return a [SimError::InvalidConfig] from a message that supports `to_string`
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError::InvalidConfig($msg.to_string()))
    };
}

/// The `SimError` is what is returned when a simulation cannot continue.
///
/// All of these errors are fatal to the run that raised them.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// A packet arrived with a timestamp earlier than the current time.
    Sequencing {
        time: Time,
        now: Time,
        source: SourceId,
    },

    /// A packet arrived from a source that has no entry in the routing table.
    UnknownSource { time: Time, source: SourceId },

    /// Accepting a packet would exceed the hard capacity of a buffer.
    Overflow {
        time: Time,
        source: SourceId,
        capacity: usize,
    },

    /// The routing configuration is not valid.
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::Sequencing { time, now, source } => write!(
                f,
                "Error: packet from {source} at time {time} arrived after time {now}"
            ),
            SimError::UnknownSource { time, source } => {
                write!(f, "Error: packet at time {time} from unknown source {source}")
            }
            SimError::Overflow {
                time,
                source,
                capacity,
            } => write!(
                f,
                "Error: buffer for {source} overflowed its capacity of {capacity} at time {time}"
            ),
            SimError::InvalidConfig(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most simulation functions
pub type SimResult<T = ()> = Result<T, SimError>;
