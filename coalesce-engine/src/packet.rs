// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A packet arriving at the NIC.

use std::fmt;

use crate::types::{SourceId, Time};

/// A single packet arrival.
///
/// Packets carry no payload. They are consumed exactly once by the
/// [`Engine`](crate::engine::Engine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    time: Time,
    source: SourceId,
}

impl Packet {
    #[must_use]
    pub fn new(time: Time, source: impl Into<SourceId>) -> Self {
        Self {
            time,
            source: source.into(),
        }
    }

    /// The logical time at which the packet arrives.
    #[must_use]
    pub fn time(&self) -> Time {
        self.time
    }

    #[must_use]
    pub fn source(&self) -> &SourceId {
        &self.source
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.source, self.time)
    }
}
