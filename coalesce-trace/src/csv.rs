// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Flat comma-separated trace files.
//!
//! Both formats have one record per line and no header:
//!  - packet trace: `time,source`
//!  - interrupt trace: `time,source[,source...]` with one source per packet
//!    signalled by the interrupt, in arrival order.
//!
//! When reading, whitespace around fields is ignored (so `\r\n` line endings
//! are accepted) and blank lines are skipped. Writing fails for any source id
//! that could not be read back unchanged.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use coalesce_engine::packet::Packet;
use coalesce_engine::trace::{InterruptEvent, InterruptTrace};
use coalesce_engine::types::{SourceId, Time};
use itertools::Itertools;

use crate::error::{TraceError, TraceResult};

fn malformed<T>(line: usize, reason: impl Into<String>) -> TraceResult<T> {
    Err(TraceError::Malformed {
        line,
        reason: reason.into(),
    })
}

fn parse_time(line: usize, field: Option<&str>) -> TraceResult<Time> {
    match field {
        None | Some("") => malformed(line, "missing time"),
        Some(field) => field
            .parse()
            .or_else(|_| malformed(line, format!("time '{field}' is not a non-negative integer"))),
    }
}

fn parse_source(line: usize, field: Option<&str>) -> TraceResult<SourceId> {
    match field {
        None | Some("") => malformed(line, "missing source"),
        Some(field) => Ok(SourceId::new(field)),
    }
}

fn check_source(source: &SourceId) -> TraceResult<()> {
    if source.is_field_safe() {
        Ok(())
    } else {
        Err(TraceError::InvalidSource(source.clone()))
    }
}

/// Return each non-blank line with its 1-based line number.
fn records<R: BufRead>(reader: R) -> impl Iterator<Item = TraceResult<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok((index + 1, line))),
            Err(e) => Some(Err(TraceError::from(e))),
        })
}

/// Read a packet trace.
///
/// The packets are returned in file order. Time ordering is left to the
/// [`Engine`](coalesce_engine::engine::Engine) to check.
pub fn read_packet_trace<R: BufRead>(reader: R) -> TraceResult<Vec<Packet>> {
    let mut packets = Vec::new();
    for record in records(reader) {
        let (line, text) = record?;
        let mut fields = text.split(',').map(str::trim);
        let time = parse_time(line, fields.next())?;
        let source = parse_source(line, fields.next())?;
        if fields.next().is_some() {
            return malformed(line, "more than two fields");
        }
        packets.push(Packet::new(time, source));
    }
    Ok(packets)
}

pub fn write_packet_trace<W: Write>(mut writer: W, packets: &[Packet]) -> TraceResult<()> {
    for packet in packets {
        check_source(packet.source())?;
        writeln!(writer, "{},{}", packet.time(), packet.source())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an interrupt trace.
///
/// Interrupts must be in non-decreasing time order.
pub fn read_interrupt_trace<R: BufRead>(reader: R) -> TraceResult<InterruptTrace> {
    let mut trace = InterruptTrace::new();
    let mut last_time = 0;
    for record in records(reader) {
        let (line, text) = record?;
        let mut fields = text.split(',').map(str::trim);
        let time = parse_time(line, fields.next())?;
        if time < last_time {
            return malformed(line, format!("time {time} is before {last_time}"));
        }
        let sources = fields
            .map(|field| parse_source(line, Some(field)))
            .collect::<TraceResult<Vec<_>>>()?;
        if sources.is_empty() {
            return malformed(line, "missing source");
        }
        trace.push(InterruptEvent::new(time, sources));
        last_time = time;
    }
    Ok(trace)
}

pub fn write_interrupt_trace<W: Write>(mut writer: W, trace: &InterruptTrace) -> TraceResult<()> {
    for interrupt in trace {
        for source in interrupt.sources() {
            check_source(source)?;
        }
        writeln!(
            writer,
            "{},{}",
            interrupt.time(),
            interrupt.sources().iter().join(",")
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_packet_trace(path: &Path) -> TraceResult<Vec<Packet>> {
    read_packet_trace(BufReader::new(File::open(path)?))
}

pub fn save_packet_trace(path: &Path, packets: &[Packet]) -> TraceResult<()> {
    write_packet_trace(BufWriter::new(File::create(path)?), packets)
}

pub fn load_interrupt_trace(path: &Path) -> TraceResult<InterruptTrace> {
    read_interrupt_trace(BufReader::new(File::open(path)?))
}

pub fn save_interrupt_trace(path: &Path, trace: &InterruptTrace) -> TraceResult<()> {
    write_interrupt_trace(BufWriter::new(File::create(path)?), trace)
}
