// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use coalesce_engine::config::{BufferConfig, RouteConfig, RoutingConfig, reference_routes};
use coalesce_engine::engine::{EndOfRun, RunReport};
use coalesce_engine::packet::Packet;
use coalesce_engine::test_helpers::{packets, start_test, test_routing};
use coalesce_engine::types::SourceId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn buffered(source: &str, config: BufferConfig) -> RoutingConfig {
    RoutingConfig::from([(SourceId::new(source), RouteConfig::Buffered(config))])
}

fn sources(ids: &[&str]) -> Vec<SourceId> {
    ids.iter().map(|id| SourceId::new(id)).collect()
}

fn run(config: &RoutingConfig, packets: Vec<Packet>) -> RunReport {
    let mut engine = start_test(file!());
    let mut routing = test_routing(&engine, config);
    engine.run(&mut routing, packets).unwrap()
}

/// A reproducible stream over the reference sources.
fn random_packets(seed: u64, num_packets: usize) -> Vec<Packet> {
    let ids = ["127.0.0.1", "127.0.0.2", "127.0.0.3"];
    let mut rng = StdRng::seed_from_u64(seed);
    let mut times: Vec<u64> = (0..num_packets).map(|_| rng.gen_range(0..100)).collect();
    times.sort_unstable();
    times
        .into_iter()
        .map(|time| Packet::new(time, ids[rng.gen_range(0..ids.len())]))
        .collect()
}

#[test]
fn count_policy_example() {
    let config = buffered("A", BufferConfig::packet_limit(2));
    let report = run(&config, packets(&[(0, "A"), (1, "A"), (2, "A")]));

    assert_eq!(report.trace.len(), 1);
    let interrupt = &report.trace.events()[0];
    assert_eq!(interrupt.time(), 1);
    assert_eq!(interrupt.sources(), sources(&["A", "A"]).as_slice());

    // The last packet is never signalled
    assert_eq!(report.packets_in, 3);
    assert_eq!(report.packets_dropped(), 1);
    assert_eq!(report.pending.get(&SourceId::new("A")), Some(&1));
}

#[test]
fn time_policy_example() {
    let config = buffered("B", BufferConfig::time_limit(5));
    let report = run(&config, packets(&[(0, "B"), (4, "B"), (6, "B")]));

    // t=0 is the first packet and 0 - 0 < 5, t=4 gives 4 < 5, t=6 gives 6 >= 5
    assert_eq!(report.trace.len(), 1);
    let interrupt = &report.trace.events()[0];
    assert_eq!(interrupt.time(), 6);
    assert_eq!(interrupt.num_packets(), 3);
    assert_eq!(report.packets_dropped(), 0);
}

#[test]
fn time_policy_measures_from_last_flush() {
    let config = buffered("B", BufferConfig::time_limit(5));
    let report = run(
        &config,
        packets(&[(5, "B"), (7, "B"), (9, "B"), (10, "B"), (15, "B")]),
    );

    let times: Vec<u64> = report.trace.iter().map(|i| i.time()).collect();
    assert_eq!(times, vec![5, 10, 15]);
    let sizes: Vec<usize> = report.trace.iter().map(|i| i.num_packets()).collect();
    assert_eq!(sizes, vec![1, 3, 1]);
}

#[test]
fn burst_flushes_on_nth_packet() {
    const LIMIT: usize = 4;
    const BURST: usize = 11;

    let config = buffered("A", BufferConfig::packet_limit(LIMIT));
    let burst = (0..BURST).map(|_| Packet::new(7, "A")).collect();
    let report = run(&config, burst);

    assert_eq!(report.trace.len(), BURST / LIMIT);
    for interrupt in &report.trace {
        assert_eq!(interrupt.time(), 7);
        assert_eq!(interrupt.num_packets(), LIMIT);
    }
    assert_eq!(report.packets_dropped(), BURST % LIMIT);
}

#[test]
fn unbuffered_pass_through() {
    let config = RoutingConfig::from([(SourceId::new("U"), RouteConfig::Unbuffered)]);
    let arrivals = packets(&[(0, "U"), (0, "U"), (3, "U"), (9, "U")]);
    let report = run(&config, arrivals.clone());

    assert_eq!(report.trace.len(), arrivals.len());
    for (interrupt, packet) in report.trace.iter().zip(arrivals.iter()) {
        assert_eq!(interrupt.time(), packet.time());
        assert_eq!(interrupt.sources(), &[packet.source().clone()]);
    }
    assert!(report.pending.is_empty());
}

#[test]
fn combined_policy_fires_on_either_limit() {
    let config = buffered(
        "C",
        BufferConfig {
            packet_limit: Some(3),
            time_limit: Some(10),
            capacity: None,
        },
    );
    let report = run(
        &config,
        packets(&[(1, "C"), (2, "C"), (3, "C"), (4, "C"), (13, "C")]),
    );

    // Packet limit at t=3, then the time limit (13 - 3 >= 10) at t=13
    let times: Vec<u64> = report.trace.iter().map(|i| i.time()).collect();
    assert_eq!(times, vec![3, 13]);
    assert_eq!(report.trace.events()[1].num_packets(), 2);
}

#[test]
fn sources_do_not_interact() {
    let config = RoutingConfig::from([
        (
            SourceId::new("A"),
            RouteConfig::Buffered(BufferConfig::packet_limit(2)),
        ),
        (
            SourceId::new("B"),
            RouteConfig::Buffered(BufferConfig::packet_limit(2)),
        ),
    ]);
    let report = run(&config, packets(&[(0, "A"), (1, "B"), (2, "A"), (3, "B")]));

    assert_eq!(report.trace.len(), 2);
    assert_eq!(report.trace.events()[0].time(), 2);
    assert_eq!(report.trace.events()[0].sources(), sources(&["A", "A"]).as_slice());
    assert_eq!(report.trace.events()[1].time(), 3);
    assert_eq!(report.trace.events()[1].sources(), sources(&["B", "B"]).as_slice());
}

#[test]
fn end_of_run_flush() {
    let config = RoutingConfig::from([
        (
            SourceId::new("A"),
            RouteConfig::Buffered(BufferConfig::packet_limit(10)),
        ),
        (
            SourceId::new("B"),
            RouteConfig::Buffered(BufferConfig::time_limit(100)),
        ),
    ]);

    let mut engine = start_test(file!());
    engine.set_end_of_run(EndOfRun::Flush);
    let mut routing = test_routing(&engine, &config);
    let report = engine
        .run(&mut routing, packets(&[(0, "B"), (1, "A"), (4, "A")]))
        .unwrap();

    assert!(report.pending.is_empty());
    assert_eq!(report.trace.len(), 2);
    assert_eq!(report.trace.events()[0].time(), 4);
    assert_eq!(report.trace.events()[0].sources(), sources(&["A", "A"]).as_slice());
    assert_eq!(report.trace.events()[1].sources(), sources(&["B"]).as_slice());
    assert_eq!(routing.buffer(&SourceId::new("B")).unwrap().last_flush_time(), 4);
}

#[test]
fn empty_input() {
    let report = run(&reference_routes(), Vec::new());
    assert!(report.trace.is_empty());
    assert_eq!(report.packets_in, 0);
    assert_eq!(report.end_time, 0);
    assert_eq!(report.coalescing_ratio(), 0.0);
}

#[test]
fn deterministic() {
    let first = run(&reference_routes(), random_packets(3, 500));
    let second = run(&reference_routes(), random_packets(3, 500));
    assert_eq!(first.trace, second.trace);
    assert_eq!(first.pending, second.pending);
}

#[test]
fn interrupt_times_are_monotonic() {
    let report = run(&reference_routes(), random_packets(11, 1000));
    for pair in report.trace.events().windows(2) {
        assert!(pair[0].time() <= pair[1].time());
    }
}

#[test]
fn packets_are_conserved() {
    for seed in 0..5 {
        let arrivals = random_packets(seed, 300);
        let num_arrivals = arrivals.len();
        let report = run(&reference_routes(), arrivals);

        assert_eq!(report.packets_in, num_arrivals);
        assert_eq!(
            report.trace.num_packets(),
            num_arrivals - report.packets_dropped()
        );
    }
}

#[test]
fn reference_routes_coalesce() {
    let report = run(&reference_routes(), random_packets(0, 100));

    // Buffered sources signal more than one packet per interrupt on average
    assert!(report.coalescing_ratio() > 1.0);
    for interrupt in &report.trace {
        let first = &interrupt.sources()[0];
        assert!(interrupt.sources().iter().all(|s| s == first));
        if first.as_str() == "127.0.0.1" {
            assert_eq!(interrupt.num_packets(), 1);
        }
        if first.as_str() == "127.0.0.2" {
            assert_eq!(interrupt.num_packets(), 10);
        }
    }
}
