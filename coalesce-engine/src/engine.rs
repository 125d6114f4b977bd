// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The discrete-event driver.
//!
//! The [Engine] walks through a time-ordered sequence of packets. For each one
//! it advances logical time to the packet's arrival, looks up the packet's
//! route and either raises an interrupt straight away (unbuffered) or places
//! the packet in the route's buffer and asks the buffer whether it should
//! flush now.
//!
//! A single packet causes at most one flush, and that flush contains exactly
//! the packets queued up to and including that packet.
//!
//! At the end of the input the [EndOfRun] setting decides what happens to
//! packets still held in buffers. By default they are dropped and reported in
//! [RunReport::pending].

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use coalesce_track::Tracker;
use coalesce_track::entity::{Entity, toplevel};
use coalesce_track::tracker::stdout_tracker;
use coalesce_track::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::packet::Packet;
use crate::routing::{Route, RoutingTable};
use crate::time::SimTime;
use crate::trace::{InterruptEvent, InterruptTrace};
use crate::types::{SimError, SimResult, SourceId, Time};

/// What happens to packets still buffered when the input is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfRun {
    /// Leave them pending. They never appear in the interrupt trace.
    #[default]
    Drop,

    /// Flush every non-empty buffer at the time of the last packet.
    Flush,
}

/// The result of a simulation that consumed all of its input.
#[derive(Debug)]
pub struct RunReport {
    /// The interrupts raised.
    pub trace: InterruptTrace,

    /// Number of packets delivered to the NIC.
    pub packets_in: usize,

    /// Packets left in each non-empty buffer at the end of the run.
    pub pending: BTreeMap<SourceId, usize>,

    /// Logical time when the run finished.
    pub end_time: Time,
}

impl RunReport {
    /// Number of packets that never raised an interrupt.
    #[must_use]
    pub fn packets_dropped(&self) -> usize {
        self.pending.values().sum()
    }

    #[must_use]
    pub fn interrupts(&self) -> usize {
        self.trace.len()
    }

    /// Average number of packets signalled per interrupt.
    #[must_use]
    pub fn coalescing_ratio(&self) -> f64 {
        if self.trace.is_empty() {
            0.0
        } else {
            self.trace.num_packets() as f64 / self.trace.len() as f64
        }
    }
}

/// The result of a simulation that stopped at an error.
///
/// The interrupts raised before the error are kept separately from any
/// successful result.
#[derive(Debug)]
pub struct RunAborted {
    pub error: SimError,

    /// Interrupts raised before the error.
    pub partial_trace: InterruptTrace,

    /// Number of packets handled before the error.
    pub packets_in: usize,
}

impl fmt::Display for RunAborted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (after {} packets, {} interrupts)",
            self.error,
            self.packets_in,
            self.partial_trace.len()
        )
    }
}

impl Error for RunAborted {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

pub struct Engine {
    toplevel: Rc<Entity>,
    time: SimTime,
    tracker: Tracker,
    end_of_run: EndOfRun,
}

impl Engine {
    /// Create a standalone engine.
    pub fn new(tracker: &Tracker) -> Self {
        let toplevel = toplevel(tracker, "top");
        let time = SimTime::new(&toplevel);
        Self {
            toplevel,
            time,
            tracker: tracker.clone(),
            end_of_run: EndOfRun::default(),
        }
    }

    pub fn set_end_of_run(&mut self, end_of_run: EndOfRun) {
        self.end_of_run = end_of_run;
    }

    /// Run all `packets` through the `routing` table.
    ///
    /// Packets must be in non-decreasing time order. The run stops at the
    /// first error.
    pub fn run<I>(&mut self, routing: &mut RoutingTable, packets: I) -> Result<RunReport, RunAborted>
    where
        I: IntoIterator<Item = Packet>,
    {
        let mut trace = InterruptTrace::new();
        let mut packets_in = 0;

        for packet in packets {
            if let Err(error) = self.deliver(routing, &packet, &mut trace) {
                error!(self.toplevel ; "{} ({})", error, packet);
                return Err(RunAborted {
                    error,
                    partial_trace: trace,
                    packets_in,
                });
            }
            packets_in += 1;
        }

        let now = self.time.now();
        if self.end_of_run == EndOfRun::Flush {
            for buffer in routing.buffers_mut() {
                if buffer.fill_level() > 0 {
                    debug!(self.toplevel ; "end of run flush of {}", buffer);
                    trace.push(InterruptEvent::new(now, buffer.flush(now)));
                }
            }
        }

        let report = RunReport {
            trace,
            packets_in,
            pending: routing.pending(),
            end_time: now,
        };
        info!(self.toplevel ; "{} packets raised {} interrupts by time {}, {} left pending",
            report.packets_in, report.interrupts(), report.end_time, report.packets_dropped());
        Ok(report)
    }

    fn deliver(
        &mut self,
        routing: &mut RoutingTable,
        packet: &Packet,
        trace: &mut InterruptTrace,
    ) -> SimResult {
        self.time.advance_to(packet)?;
        let now = self.time.now();
        let source = packet.source();

        match routing.route_mut(source, now)? {
            Route::Unbuffered => {
                trace.push(InterruptEvent::new(now, vec![source.clone()]));
            }
            Route::Buffered(buffer) => {
                buffer.accept(now)?;
                if buffer.should_flush(now) {
                    trace.push(InterruptEvent::new(now, buffer.flush(now)));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn time_now(&self) -> Time {
        self.time.now()
    }

    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }

    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }
}

/// Create a default engine that sends track events to stdout.
///
/// This is provided to keep documentation examples simple.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stdout_tracker(log::Level::Warn);
        Self::new(&tracker)
    }
}
