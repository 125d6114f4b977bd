// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use coalesce_track::test_helpers::create_tracker;

use crate::config::RoutingConfig;
use crate::engine::Engine;
use crate::packet::Packet;
use crate::routing::RoutingTable;

#[must_use]
pub fn start_test(full_filepath: &str) -> Engine {
    Engine::new(&create_tracker(full_filepath))
}

/// Build the routing table for a test under the engine top-level.
///
/// **Panics** if the configuration is invalid.
#[must_use]
pub fn test_routing(engine: &Engine, config: &RoutingConfig) -> RoutingTable {
    RoutingTable::from_config(engine.top(), "nic", config).unwrap()
}

/// Build packets from `(time, source)` pairs.
#[must_use]
pub fn packets(arrivals: &[(u64, &str)]) -> Vec<Packet> {
    arrivals
        .iter()
        .map(|(time, source)| Packet::new(*time, *source))
        .collect()
}
