// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The interrupt trace produced by a simulation.

use std::fmt;
use std::slice;

use itertools::Itertools;

use crate::types::{SourceId, Time};

/// One interrupt raised by the NIC.
///
/// `sources` holds one entry per packet that the interrupt signals, in the
/// order the packets arrived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptEvent {
    time: Time,
    sources: Vec<SourceId>,
}

impl InterruptEvent {
    #[must_use]
    pub fn new(time: Time, sources: Vec<SourceId>) -> Self {
        Self { time, sources }
    }

    #[must_use]
    pub fn time(&self) -> Time {
        self.time
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Number of packets signalled by this interrupt.
    #[must_use]
    pub fn num_packets(&self) -> usize {
        self.sources.len()
    }
}

impl fmt::Display for InterruptEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: [{}]", self.time, self.sources.iter().join(", "))
    }
}

/// The append-only log of interrupts in the order they were raised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterruptTrace {
    events: Vec<InterruptEvent>,
}

impl InterruptTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interrupt.
    ///
    /// **Panics** if the interrupt is earlier than the last one appended.
    pub fn push(&mut self, event: InterruptEvent) {
        if let Some(last) = self.events.last() {
            assert!(
                event.time >= last.time,
                "Interrupt at {} appended after interrupt at {}",
                event.time,
                last.time
            );
        }
        self.events.push(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, InterruptEvent> {
        self.events.iter()
    }

    #[must_use]
    pub fn events(&self) -> &[InterruptEvent] {
        &self.events
    }

    /// Total number of packets signalled across all interrupts.
    #[must_use]
    pub fn num_packets(&self) -> usize {
        self.events.iter().map(InterruptEvent::num_packets).sum()
    }
}

impl FromIterator<InterruptEvent> for InterruptTrace {
    fn from_iter<I: IntoIterator<Item = InterruptEvent>>(iter: I) -> Self {
        let mut trace = InterruptTrace::new();
        for event in iter {
            trace.push(event);
        }
        trace
    }
}

impl IntoIterator for InterruptTrace {
    type Item = InterruptEvent;
    type IntoIter = std::vec::IntoIter<InterruptEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a InterruptTrace {
    type Item = &'a InterruptEvent;
    type IntoIter = slice::Iter<'a, InterruptEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
