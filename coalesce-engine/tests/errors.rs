// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use coalesce_engine::config::{BufferConfig, RouteConfig, RoutingConfig};
use coalesce_engine::routing::RoutingTable;
use coalesce_engine::test_helpers::{packets, start_test, test_routing};
use coalesce_engine::types::{SimError, SourceId};

fn mixed_routes() -> RoutingConfig {
    RoutingConfig::from([
        (SourceId::new("U"), RouteConfig::Unbuffered),
        (
            SourceId::new("B"),
            RouteConfig::Buffered(BufferConfig::time_limit(5).with_capacity(2)),
        ),
    ])
}

#[test]
fn out_of_order_packets() {
    let mut engine = start_test(file!());
    let mut routing = test_routing(&engine, &mixed_routes());

    let aborted = engine
        .run(&mut routing, packets(&[(0, "U"), (3, "U"), (2, "U"), (4, "U")]))
        .unwrap_err();

    assert_eq!(
        aborted.error,
        SimError::Sequencing {
            time: 2,
            now: 3,
            source: SourceId::new("U"),
        }
    );
    assert_eq!(aborted.packets_in, 2);
    assert_eq!(aborted.partial_trace.len(), 2);
    assert_eq!(
        format!("{aborted}"),
        "Error: packet from U at time 2 arrived after time 3 (after 2 packets, 2 interrupts)"
    );
}

#[test]
fn unknown_source() {
    let mut engine = start_test(file!());
    let mut routing = test_routing(&engine, &mixed_routes());

    let aborted = engine
        .run(&mut routing, packets(&[(0, "U"), (1, "X"), (2, "U")]))
        .unwrap_err();

    assert_eq!(
        aborted.error,
        SimError::UnknownSource {
            time: 1,
            source: SourceId::new("X"),
        }
    );
    assert_eq!(aborted.partial_trace.len(), 1);
    assert_eq!(
        format!("{}", aborted.error),
        "Error: packet at time 1 from unknown source X"
    );
}

#[test]
fn overflow_before_time_limit() {
    let mut engine = start_test(file!());
    let mut routing = test_routing(&engine, &mixed_routes());

    // Three packets arrive before the time-based flush can fire
    let aborted = engine
        .run(
            &mut routing,
            packets(&[(0, "B"), (1, "U"), (2, "B"), (3, "B")]),
        )
        .unwrap_err();

    assert_eq!(
        aborted.error,
        SimError::Overflow {
            time: 3,
            source: SourceId::new("B"),
            capacity: 2,
        }
    );
    assert_eq!(aborted.packets_in, 3);
    assert_eq!(aborted.partial_trace.len(), 1);
    assert_eq!(routing.buffer(&SourceId::new("B")).unwrap().fill_level(), 2);
}

#[test]
fn capacity_is_not_reached_when_flushing() {
    let mut engine = start_test(file!());
    let mut routing = test_routing(&engine, &mixed_routes());

    let report = engine
        .run(
            &mut routing,
            packets(&[(0, "B"), (5, "B"), (6, "B"), (10, "B")]),
        )
        .unwrap();
    assert_eq!(report.trace.len(), 2);
}

#[test]
fn huge_capacity_is_only_a_limit() {
    let mut engine = start_test(file!());
    let config = RoutingConfig::from([
        (
            SourceId::new("A"),
            RouteConfig::Buffered(BufferConfig::packet_limit(10).with_capacity(usize::MAX)),
        ),
        (
            SourceId::new("B"),
            RouteConfig::Buffered(BufferConfig::time_limit(5).with_capacity(1_000_000_000)),
        ),
    ]);
    let mut routing = test_routing(&engine, &config);

    let arrivals: Vec<_> = (0..25)
        .flat_map(|time| [(time, "A"), (time, "B")])
        .collect();
    let report = engine.run(&mut routing, packets(&arrivals)).unwrap();

    assert_eq!(report.packets_in, 50);
    assert_eq!(report.trace.num_packets() + report.packets_dropped(), 50);
    assert_eq!(routing.buffer(&SourceId::new("A")).unwrap().fill_level(), 5);
}

#[test]
fn duplicate_route() {
    let engine = start_test(file!());
    let mut routing = RoutingTable::new(engine.top(), "nic");
    let source = SourceId::new("A");

    routing.register(&source, &RouteConfig::Unbuffered).unwrap();
    let err = routing
        .register(&source, &RouteConfig::Unbuffered)
        .unwrap_err();
    assert_eq!(
        err,
        SimError::InvalidConfig("top::nic: duplicate route for A".to_string())
    );
    assert_eq!(routing.len(), 1);
}

#[test]
fn invalid_buffer_config() {
    let engine = start_test(file!());
    let config = RoutingConfig::from([(
        SourceId::new("A"),
        RouteConfig::Buffered(BufferConfig::packet_limit(0)),
    )]);

    let result = RoutingTable::from_config(engine.top(), "nic", &config);
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}

#[test]
fn time_continues_across_runs() {
    let mut engine = start_test(file!());
    let mut routing = test_routing(&engine, &mixed_routes());

    engine.run(&mut routing, packets(&[(10, "U")])).unwrap();
    assert_eq!(engine.time_now(), 10);

    let aborted = engine
        .run(&mut routing, packets(&[(9, "U")]))
        .unwrap_err();
    assert!(matches!(aborted.error, SimError::Sequencing { .. }));
    assert!(aborted.partial_trace.is_empty());
}

#[test]
fn source_ids_must_fit_trace_fields() {
    let engine = start_test(file!());
    let mut routing = RoutingTable::new(engine.top(), "nic");

    for id in ["a,b", " A", "B ", ""] {
        let err = routing
            .register(&SourceId::new(id), &RouteConfig::Unbuffered)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }
    assert!(routing.is_empty());
}
