// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A synthetic packet trace generator.
//!
//! Arrival times are drawn uniformly from `[0, max_time)` and sorted. Each
//! packet is then independently given a source drawn from a fixed categorical
//! distribution. The random number generator is seeded from the
//! configuration, so a configuration always produces the same trace.
//!
//! ```rust
//! use coalesce_trace::generator::{GeneratorConfig, PacketGenerator};
//!
//! let config = GeneratorConfig::default();
//! let packets = PacketGenerator::new(&config).unwrap().generate();
//! assert_eq!(packets.len(), config.num_packets);
//! ```

use coalesce_engine::packet::Packet;
use coalesce_engine::types::{SourceId, Time};
use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{TraceError, TraceResult};

/// Allowed error in the sum of the source probabilities.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// A source and the probability that a packet comes from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceWeight {
    pub id: SourceId,
    pub probability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub num_packets: usize,

    /// Exclusive upper bound of the arrival times.
    pub max_time: Time,

    /// Probabilities must sum to 1.
    pub sources: Vec<SourceWeight>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let source = |id: &str, probability: f64| SourceWeight {
            id: SourceId::new(id),
            probability,
        };
        Self {
            seed: 0,
            num_packets: 100,
            max_time: 100,
            sources: vec![
                source("127.0.0.1", 0.1),
                source("127.0.0.2", 0.3),
                source("127.0.0.3", 0.6),
            ],
        }
    }
}

pub struct PacketGenerator {
    rng: StdRng,
    times: Uniform<Time>,
    source_index: WeightedIndex<f64>,
    sources: Vec<SourceId>,
    num_packets: usize,
}

impl PacketGenerator {
    /// Create a generator, checking that the configuration can be sampled.
    pub fn new(config: &GeneratorConfig) -> TraceResult<Self> {
        if config.max_time == 0 {
            return Err(TraceError::Generator(
                "max_time must be at least 1".to_string(),
            ));
        }
        if config.sources.is_empty() {
            return Err(TraceError::Generator(
                "at least one source is required".to_string(),
            ));
        }

        if let Some(source) = config.sources.iter().find(|s| !s.id.is_field_safe()) {
            return Err(TraceError::InvalidSource(source.id.clone()));
        }

        let total: f64 = config.sources.iter().map(|s| s.probability).sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(TraceError::Generator(format!(
                "source probabilities sum to {total}, not 1"
            )));
        }

        let source_index = WeightedIndex::new(config.sources.iter().map(|s| s.probability))
            .map_err(|e| TraceError::Generator(format!("invalid source probabilities: {e}")))?;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            times: Uniform::new(0, config.max_time),
            source_index,
            sources: config.sources.iter().map(|s| s.id.clone()).collect(),
            num_packets: config.num_packets,
        })
    }

    /// Produce a time-ordered packet trace.
    pub fn generate(&mut self) -> Vec<Packet> {
        let mut times: Vec<Time> = (0..self.num_packets)
            .map(|_| self.times.sample(&mut self.rng))
            .collect();
        times.sort_unstable();

        times
            .into_iter()
            .map(|time| {
                let index = self.source_index.sample(&mut self.rng);
                Packet::new(time, self.sources[index].clone())
            })
            .collect()
    }
}
