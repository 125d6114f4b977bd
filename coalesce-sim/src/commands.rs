// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The work done by each sub-command.

use std::path::Path;

use coalesce_engine::engine::{Engine, RunReport};
use coalesce_engine::routing::RoutingTable;
use coalesce_trace::csv::{load_packet_trace, save_interrupt_trace, save_packet_trace};
use coalesce_trace::generator::PacketGenerator;
use coalesce_track::Tracker;
use coalesce_track::entity::toplevel;
use coalesce_track::info;

use crate::config::SimConfig;
use crate::error::AppError;

/// Write a synthetic packet trace to `output`.
///
/// Returns the number of packets written.
pub fn generate(tracker: &Tracker, config: &SimConfig, output: &Path) -> Result<usize, AppError> {
    let top = toplevel(tracker, "generator");
    let packets = PacketGenerator::new(&config.generator)?.generate();
    save_packet_trace(output, &packets)?;
    info!(top ; "wrote {} packets to {}", packets.len(), output.display());
    Ok(packets.len())
}

/// Simulate the packet trace in `input` and write the interrupts to `output`.
///
/// Nothing is written if the simulation is aborted.
pub fn simulate(
    tracker: &Tracker,
    config: &SimConfig,
    input: &Path,
    output: &Path,
) -> Result<RunReport, AppError> {
    let packets = load_packet_trace(input)?;

    let mut engine = Engine::new(tracker);
    engine.set_end_of_run(config.end_of_run);
    let mut routing = RoutingTable::from_config(engine.top(), "nic", &config.routes)?;

    let report = engine.run(&mut routing, packets)?;
    save_interrupt_trace(output, &report.trace)?;
    info!(engine.top() ; "wrote {} interrupts to {}, coalescing ratio {:.2}",
        report.interrupts(), output.display(), report.coalescing_ratio());
    Ok(report)
}
