// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Routing configuration.
//!
//! The configuration maps each expected source to the way its packets are
//! handled. It is fixed at startup and is used to build the
//! [`RoutingTable`](crate::routing::RoutingTable).
//!
//! The configuration can be deserialized, for example from TOML:
//! ```toml
//! [routes."127.0.0.1"]
//! policy = "unbuffered"
//!
//! [routes."127.0.0.2"]
//! policy = "buffered"
//! packet_limit = 10
//!
//! [routes."127.0.0.3"]
//! policy = "buffered"
//! time_limit = 5
//! capacity = 128
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim_error;
use crate::types::{SimResult, SourceId, Time};

/// The thresholds of a buffered route.
///
/// A flush is triggered when any configured threshold is reached. If neither
/// threshold is set the buffer never flushes on its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Flush once this many packets are pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_limit: Option<usize>,

    /// Flush once this much time has passed since the last flush.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<Time>,

    /// Hard limit on the number of pending packets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl BufferConfig {
    #[must_use]
    pub fn packet_limit(limit: usize) -> Self {
        Self {
            packet_limit: Some(limit),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn time_limit(limit: Time) -> Self {
        Self {
            time_limit: Some(limit),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Check that every configured value is usable.
    pub fn validate(&self, source: &SourceId) -> SimResult {
        if self.packet_limit == Some(0) {
            return sim_error!(format!("{source}: packet_limit must be at least 1"));
        }
        if self.time_limit == Some(0) {
            return sim_error!(format!("{source}: time_limit must be at least 1"));
        }
        if self.capacity == Some(0) {
            return sim_error!(format!("{source}: capacity must be at least 1"));
        }
        Ok(())
    }

    /// A packet limit above the capacity means the buffer overflows before
    /// the packet limit can ever be reached.
    #[must_use]
    pub fn limit_exceeds_capacity(&self) -> bool {
        matches!(
            (self.packet_limit, self.capacity),
            (Some(limit), Some(capacity)) if limit > capacity
        )
    }
}

/// How the packets of one source are turned into interrupts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RouteConfig {
    /// Every packet raises its own interrupt.
    Unbuffered,

    /// Packets are held in a buffer and coalesced.
    Buffered(BufferConfig),
}

/// The route for each expected source.
pub type RoutingConfig = BTreeMap<SourceId, RouteConfig>;

/// The routes used by the reference NIC model.
///
/// - `127.0.0.1` is not buffered.
/// - `127.0.0.2` flushes every 10 packets.
/// - `127.0.0.3` flushes every 5 time units and holds at most 128 packets.
#[must_use]
pub fn reference_routes() -> RoutingConfig {
    BTreeMap::from([
        (SourceId::new("127.0.0.1"), RouteConfig::Unbuffered),
        (
            SourceId::new("127.0.0.2"),
            RouteConfig::Buffered(BufferConfig::packet_limit(10)),
        ),
        (
            SourceId::new("127.0.0.3"),
            RouteConfig::Buffered(BufferConfig::time_limit(5).with_capacity(128)),
        ),
    ])
}
