// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A per-source packet buffer.
//!
//! The [Buffer] accumulates the packets of a single source until its attached
//! [Flush] policy decides that they should be released as one interrupt.
//!
//! The buffer is a plain container: it holds the pending packets and the time
//! of the last flush, and asks its policy for a decision when requested. An
//! optional hard capacity can be set, in which case accepting a packet into a
//! full buffer is reported as a [SimError::Overflow].
//!
//! # Build a buffer
//!
//! ```rust
//! use coalesce_engine::buffer::{Buffer, BufferState};
//! use coalesce_engine::policy::PacketLimit;
//! use coalesce_engine::types::SourceId;
//! use coalesce_track::entity::toplevel;
//! use coalesce_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let source = SourceId::new("127.0.0.2");
//! let mut buffer = Buffer::new(&top, &source, Box::new(PacketLimit::new(2)), None);
//!
//! buffer.accept(0).unwrap();
//! assert!(!buffer.should_flush(0));
//! buffer.accept(1).unwrap();
//! assert!(buffer.should_flush(1));
//!
//! let flushed = buffer.flush(1);
//! assert_eq!(flushed.len(), 2);
//! assert_eq!(buffer.state(), BufferState::Empty);
//! assert_eq!(buffer.last_flush_time(), 1);
//! ```

use std::fmt;
use std::rc::Rc;

use coalesce_track::entity::Entity;
use coalesce_track::{debug, trace, value};

use crate::policy::{Flush, FlushState};
use crate::types::{SimError, SimResult, SourceId, Time};

/// The state of a [Buffer].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    /// No packets are pending.
    Empty,

    /// At least one packet has been accepted since the last flush.
    Accumulating,
}

impl fmt::Display for BufferState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BufferState::Empty => write!(f, "Empty"),
            BufferState::Accumulating => write!(f, "Accumulating"),
        }
    }
}

/// A buffer holding the pending packets of one source.
pub struct Buffer {
    pub entity: Rc<Entity>,
    source: SourceId,
    pending: Vec<SourceId>,
    last_flush_time: Time,
    capacity: Option<usize>,
    policy: Box<dyn Flush>,
}

impl Buffer {
    /// Basic buffer constructor
    ///
    /// **Panics** if `capacity` is `Some(0)`.
    #[must_use]
    pub fn new(
        parent: &Rc<Entity>,
        source: &SourceId,
        policy: Box<dyn Flush>,
        capacity: Option<usize>,
    ) -> Self {
        assert_ne!(capacity, Some(0), "Unsupported Buffer with 0 capacity");
        let entity = Rc::new(Entity::new(parent, source.as_str()));
        debug!(entity ; "policy {}, capacity {:?}", policy, capacity);
        Self {
            entity,
            source: source.clone(),
            pending: Vec::new(),
            last_flush_time: 0,
            capacity,
            policy,
        }
    }

    /// Append a packet from this buffer's source to the pending packets.
    ///
    /// Fails if the buffer is already holding `capacity` packets.
    pub fn accept(&mut self, now: Time) -> SimResult {
        if let Some(capacity) = self.capacity {
            if self.pending.len() >= capacity {
                return Err(SimError::Overflow {
                    time: now,
                    source: self.source.clone(),
                    capacity,
                });
            }
        }

        self.pending.push(self.source.clone());
        trace!(self.entity ; "accept at {}, level {}", now, self.pending.len());
        value!(self.entity ; self.pending.len());
        Ok(())
    }

    /// Ask the policy whether the pending packets should be released at
    /// time `now`.
    #[must_use]
    pub fn should_flush(&self, now: Time) -> bool {
        let state = FlushState {
            fill_level: self.pending.len(),
            last_flush_time: self.last_flush_time,
        };
        self.policy.should_flush(&state, now)
    }

    /// Release all pending packets in arrival order.
    ///
    /// Flushing an empty buffer returns nothing but still records `now` as
    /// the last flush time.
    pub fn flush(&mut self, now: Time) -> Vec<SourceId> {
        let flushed = std::mem::take(&mut self.pending);
        self.last_flush_time = now;
        debug!(self.entity ; "flush {} at {}", flushed.len(), now);
        value!(self.entity ; 0);
        flushed
    }

    #[must_use]
    pub fn fill_level(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn pending(&self) -> &[SourceId] {
        &self.pending
    }

    #[must_use]
    pub fn last_flush_time(&self) -> Time {
        self.last_flush_time
    }

    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    #[must_use]
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    #[must_use]
    pub fn state(&self) -> BufferState {
        if self.pending.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Accumulating
        }
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.entity)
    }
}

#[cfg(test)]
mod tests {
    use coalesce_track::entity::toplevel;
    use coalesce_track::test_helpers::check_and_clear;
    use coalesce_track::test_init;

    use super::*;
    use crate::policy::{Never, TimeLimit};

    #[test]
    fn overflow_at_capacity() {
        let (_test_tracker, tracker) = test_init!(1);
        let top = toplevel(&tracker, "top");
        let source = SourceId::new("B");
        let mut buffer = Buffer::new(&top, &source, Box::new(TimeLimit::new(5)), Some(2));

        buffer.accept(0).unwrap();
        buffer.accept(1).unwrap();
        let err = buffer.accept(2).unwrap_err();
        assert_eq!(
            err,
            SimError::Overflow {
                time: 2,
                source,
                capacity: 2
            }
        );
        assert_eq!(buffer.fill_level(), 2);
    }

    #[test]
    fn state_machine() {
        let (_test_tracker, tracker) = test_init!(1);
        let top = toplevel(&tracker, "top");
        let source = SourceId::new("A");
        let mut buffer = Buffer::new(&top, &source, Box::new(Never), None);

        assert_eq!(buffer.state(), BufferState::Empty);
        buffer.accept(3).unwrap();
        assert_eq!(buffer.state(), BufferState::Accumulating);
        assert!(!buffer.should_flush(3));

        assert_eq!(buffer.flush(7), vec![source.clone()]);
        assert_eq!(buffer.state(), BufferState::Empty);
        assert_eq!(buffer.last_flush_time(), 7);

        // An empty flush still moves the last flush time on
        assert!(buffer.flush(9).is_empty());
        assert_eq!(buffer.last_flush_time(), 9);
    }

    #[test]
    fn pending_packets_are_from_own_source() {
        let (_test_tracker, tracker) = test_init!(1);
        let top = toplevel(&tracker, "top");
        let source = SourceId::new("127.0.0.3");
        let mut buffer = Buffer::new(&top, &source, Box::new(Never), None);

        for now in 0..3 {
            buffer.accept(now).unwrap();
        }
        assert_eq!(buffer.pending(), vec![source.clone(); 3].as_slice());
        assert_eq!(buffer.flush(3), vec![source; 3]);
    }

    #[test]
    fn capacity_does_not_reserve_storage() {
        let (_test_tracker, tracker) = test_init!(1);
        let top = toplevel(&tracker, "top");
        let source = SourceId::new("A");
        let mut buffer = Buffer::new(&top, &source, Box::new(Never), Some(usize::MAX));

        buffer.accept(0).unwrap();
        assert_eq!(buffer.fill_level(), 1);
        assert_eq!(buffer.capacity(), Some(usize::MAX));
    }

    #[test]
    fn tracked_events() {
        let (test_tracker, tracker) = test_init!(1);
        let top = toplevel(&tracker, "top");
        let source = SourceId::new("A");
        let mut buffer = Buffer::new(&top, &source, Box::new(Never), Some(4));
        check_and_clear(
            &test_tracker,
            &[
                "created 1, top",
                "^1: created 2, top::A$",
                "^2:DEBUG: policy never, capacity Some\\(4\\)$",
            ],
        );

        buffer.accept(5).unwrap();
        buffer.flush(6);
        check_and_clear(
            &test_tracker,
            &[
                "^2:TRACE: accept at 5, level 1$",
                "^2: set to 1$",
                "^2:DEBUG: flush 1 at 6$",
                "^2: set to 0$",
            ],
        );
    }
}
