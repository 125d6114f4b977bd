// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::io::Cursor;

use coalesce_trace::csv::{read_packet_trace, write_packet_trace};
use coalesce_trace::generator::{GeneratorConfig, PacketGenerator};

#[test]
fn generated_trace_survives_file() {
    let config = GeneratorConfig {
        seed: 99,
        ..Default::default()
    };
    let packets = PacketGenerator::new(&config).unwrap().generate();

    let mut out = Vec::new();
    write_packet_trace(&mut out, &packets).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), config.num_packets);
    assert_eq!(read_packet_trace(Cursor::new(text)).unwrap(), packets);
}

#[test]
fn empty_trace() {
    let config = GeneratorConfig {
        num_packets: 0,
        ..Default::default()
    };
    assert!(PacketGenerator::new(&config).unwrap().generate().is_empty());
}

#[test]
fn single_tick() {
    let config = GeneratorConfig {
        max_time: 1,
        num_packets: 20,
        ..Default::default()
    };
    let packets = PacketGenerator::new(&config).unwrap().generate();
    assert!(packets.iter().all(|p| p.time() == 0));
}

#[test]
fn tolerates_rounding_in_probabilities() {
    let mut config = GeneratorConfig::default();
    config.sources[0].probability = 0.1 + 1e-12;
    assert!(PacketGenerator::new(&config).is_ok());

    config.sources[0].probability = 0.1 + 1e-6;
    assert!(PacketGenerator::new(&config).is_err());
}
