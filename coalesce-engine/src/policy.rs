// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Flush policies.
//!
//! A flush policy decides whether the packets accumulated in a
//! [`Buffer`](crate::buffer::Buffer) should be released as a single interrupt.
//! The policy never touches the pending packets itself, it is only shown a
//! [`FlushState`] snapshot of the buffer.
//!
//! Policies are evaluated lazily: only when a packet arrives at the buffer.
//! There is no background timer, so a time-based policy can only fire on the
//! arrival of a packet.
//!
//! The policies provided are:
//!  - [`PacketLimit`]: flush once the number of pending packets reaches a
//!    limit.
//!  - [`TimeLimit`]: flush once enough time has passed since the last flush.
//!  - [`AnyOf`]: flush if any of a set of policies would flush.
//!  - [`Never`]: never flush, the buffer is an unbounded accumulator.

use std::fmt;

use itertools::Itertools;

use crate::types::Time;

/// The view of a buffer that a [`Flush`] policy is shown.
#[derive(Clone, Copy, Debug)]
pub struct FlushState {
    /// Number of packets currently pending.
    pub fill_level: usize,

    /// Time of the most recent flush (0 if there has not been one).
    pub last_flush_time: Time,
}

/// The interface of all flush policies.
pub trait Flush: fmt::Display {
    /// Return whether the buffer should be flushed at time `now`.
    fn should_flush(&self, state: &FlushState, now: Time) -> bool;
}

/// Flush when `fill_level >= limit`.
pub struct PacketLimit {
    limit: usize,
}

impl PacketLimit {
    /// **Panics** if `limit` is 0.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        assert_ne!(limit, 0, "Unsupported PacketLimit of 0");
        Self { limit }
    }
}

impl Flush for PacketLimit {
    fn should_flush(&self, state: &FlushState, _now: Time) -> bool {
        state.fill_level >= self.limit
    }
}

impl fmt::Display for PacketLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "packet_limit={}", self.limit)
    }
}

/// Flush when `now - last_flush_time >= limit`.
pub struct TimeLimit {
    limit: Time,
}

impl TimeLimit {
    /// **Panics** if `limit` is 0.
    #[must_use]
    pub fn new(limit: Time) -> Self {
        assert_ne!(limit, 0, "Unsupported TimeLimit of 0");
        Self { limit }
    }
}

impl Flush for TimeLimit {
    fn should_flush(&self, state: &FlushState, now: Time) -> bool {
        now.saturating_sub(state.last_flush_time) >= self.limit
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "time_limit={}", self.limit)
    }
}

/// Flush if any of the contained policies would flush.
pub struct AnyOf {
    policies: Vec<Box<dyn Flush>>,
}

impl AnyOf {
    #[must_use]
    pub fn new(policies: Vec<Box<dyn Flush>>) -> Self {
        Self { policies }
    }
}

impl Flush for AnyOf {
    fn should_flush(&self, state: &FlushState, now: Time) -> bool {
        self.policies.iter().any(|p| p.should_flush(state, now))
    }
}

impl fmt::Display for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "any_of({})", self.policies.iter().join(", "))
    }
}

/// Never flush.
pub struct Never;

impl Flush for Never {
    fn should_flush(&self, _state: &FlushState, _now: Time) -> bool {
        false
    }
}

impl fmt::Display for Never {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "never")
    }
}

/// Build the policy for a set of optional thresholds.
///
/// One threshold gives that policy, both give an [`AnyOf`] and none gives
/// [`Never`].
#[must_use]
pub fn build_policy(packet_limit: Option<usize>, time_limit: Option<Time>) -> Box<dyn Flush> {
    match (packet_limit, time_limit) {
        (Some(packets), Some(time)) => Box::new(AnyOf::new(vec![
            Box::new(PacketLimit::new(packets)),
            Box::new(TimeLimit::new(time)),
        ])),
        (Some(packets), None) => Box::new(PacketLimit::new(packets)),
        (None, Some(time)) => Box::new(TimeLimit::new(time)),
        (None, None) => Box::new(Never),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(fill_level: usize, last_flush_time: Time) -> FlushState {
        FlushState {
            fill_level,
            last_flush_time,
        }
    }

    #[test]
    fn packet_limit() {
        let policy = PacketLimit::new(3);
        assert!(!policy.should_flush(&state(2, 0), 100));
        assert!(policy.should_flush(&state(3, 0), 0));
        assert!(policy.should_flush(&state(4, 0), 0));
    }

    #[test]
    fn time_limit() {
        let policy = TimeLimit::new(5);
        assert!(!policy.should_flush(&state(1, 0), 4));
        assert!(policy.should_flush(&state(1, 0), 5));
        assert!(!policy.should_flush(&state(1, 10), 14));
        assert!(policy.should_flush(&state(1, 10), 16));
    }

    #[test]
    fn combined_is_logical_or() {
        let policy = build_policy(Some(2), Some(5));
        assert!(!policy.should_flush(&state(1, 0), 4));
        assert!(policy.should_flush(&state(2, 0), 4));
        assert!(policy.should_flush(&state(1, 0), 5));
        assert_eq!(format!("{policy}"), "any_of(packet_limit=2, time_limit=5)");
    }

    #[test]
    fn no_threshold_never_flushes() {
        let policy = build_policy(None, None);
        assert!(!policy.should_flush(&state(1000, 0), Time::MAX));
    }

    #[test]
    #[should_panic(expected = "Unsupported PacketLimit of 0")]
    fn zero_packet_limit() {
        let _ = PacketLimit::new(0);
    }
}
