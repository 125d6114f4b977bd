// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! Simulation of how a network interface card turns packet arrivals into
//! processor interrupts under different interrupt-coalescing policies.
//!
//! Packets arrive as a time-ordered sequence of `(time, source)` pairs. The
//! [engine](crate::engine::Engine) advances logical time to each arrival and
//! hands the packet to the [route](crate::routing::Route) registered for its
//! source:
//!  - unbuffered sources raise one interrupt per packet.
//!  - buffered sources accumulate packets in a [buffer](crate::buffer::Buffer)
//!    until its [flush policy](crate::policy) fires, at which point all of
//!    the pending packets are signalled by a single interrupt.
//!
//! The resulting [interrupt trace](crate::trace::InterruptTrace) lists every
//! interrupt with the packets it signals.
//!
//! # Simple Application
//!
//! ```rust
//! use coalesce_engine::config::{BufferConfig, RouteConfig, RoutingConfig};
//! use coalesce_engine::engine::Engine;
//! use coalesce_engine::packet::Packet;
//! use coalesce_engine::routing::RoutingTable;
//! use coalesce_engine::types::SourceId;
//!
//! let mut engine = Engine::default();
//! let config = RoutingConfig::from([(
//!     SourceId::new("A"),
//!     RouteConfig::Buffered(BufferConfig::packet_limit(2)),
//! )]);
//! let mut routing = RoutingTable::from_config(engine.top(), "nic", &config).unwrap();
//!
//! let packets = vec![Packet::new(0, "A"), Packet::new(1, "A"), Packet::new(2, "A")];
//! let report = engine.run(&mut routing, packets).unwrap();
//!
//! // The first two packets share an interrupt, the third is still pending.
//! assert_eq!(report.trace.len(), 1);
//! assert_eq!(report.trace.events()[0].time(), 1);
//! assert_eq!(report.packets_dropped(), 1);
//! ```

pub mod buffer;
pub mod config;
pub mod engine;
pub mod packet;
pub mod policy;
pub mod routing;
pub mod test_helpers;
pub mod time;
pub mod trace;
pub mod types;
