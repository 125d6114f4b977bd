// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Route packets from each source to the way they are handled.
//!
//! The [RoutingTable] is built once from a
//! [`RoutingConfig`](crate::config::RoutingConfig) and is not reconfigured
//! during a simulation. Every source must be registered: a packet from an
//! unregistered source is a [SimError::UnknownSource] since there is no
//! default route.

use std::collections::BTreeMap;
use std::rc::Rc;

use coalesce_track::entity::Entity;
use coalesce_track::{debug, warn};

use crate::buffer::Buffer;
use crate::config::{RouteConfig, RoutingConfig};
use crate::policy::build_policy;
use crate::sim_error;
use crate::types::{SimError, SimResult, SourceId, Time};

/// Where packets from a source go.
pub enum Route {
    /// Raise an interrupt for every packet.
    Unbuffered,

    /// Coalesce packets in a buffer owned by this route.
    Buffered(Buffer),
}

/// The mapping from each source to its [Route].
pub struct RoutingTable {
    pub entity: Rc<Entity>,
    routes: BTreeMap<SourceId, Route>,
}

impl RoutingTable {
    /// Create an empty routing table.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            routes: BTreeMap::new(),
        }
    }

    /// Create a routing table with all the routes in `config`.
    pub fn from_config(parent: &Rc<Entity>, name: &str, config: &RoutingConfig) -> SimResult<Self> {
        let mut table = Self::new(parent, name);
        for (source, route) in config {
            table.register(source, route)?;
        }
        Ok(table)
    }

    /// Add the route for a source.
    ///
    /// Buffered routes create their [Buffer] here.
    pub fn register(&mut self, source: &SourceId, config: &RouteConfig) -> SimResult {
        if self.routes.contains_key(source) {
            return sim_error!(format!("{}: duplicate route for {source}", self.entity));
        }
        if !source.is_field_safe() {
            return sim_error!(format!(
                "{}: source '{source}' must be non-empty without commas or surrounding whitespace",
                self.entity
            ));
        }

        let route = match config {
            RouteConfig::Unbuffered => {
                debug!(self.entity ; "{} unbuffered", source);
                Route::Unbuffered
            }
            RouteConfig::Buffered(buffer_config) => {
                buffer_config.validate(source)?;
                if buffer_config.limit_exceeds_capacity() {
                    warn!(self.entity ; "{}: packet_limit {:?} exceeds capacity {:?}, the buffer will overflow",
                        source, buffer_config.packet_limit, buffer_config.capacity);
                }
                let policy = build_policy(buffer_config.packet_limit, buffer_config.time_limit);
                Route::Buffered(Buffer::new(
                    &self.entity,
                    source,
                    policy,
                    buffer_config.capacity,
                ))
            }
        };
        self.routes.insert(source.clone(), route);
        Ok(())
    }

    /// Look up the route for a packet from `source` arriving at `time`.
    pub fn route_mut(&mut self, source: &SourceId, time: Time) -> SimResult<&mut Route> {
        self.routes
            .get_mut(source)
            .ok_or_else(|| SimError::UnknownSource {
                time,
                source: source.clone(),
            })
    }

    /// The buffer for `source`, if it is buffered.
    #[must_use]
    pub fn buffer(&self, source: &SourceId) -> Option<&Buffer> {
        match self.routes.get(source) {
            Some(Route::Buffered(buffer)) => Some(buffer),
            _ => None,
        }
    }

    /// All buffers in source order.
    pub fn buffers_mut(&mut self) -> impl Iterator<Item = &mut Buffer> {
        self.routes.values_mut().filter_map(|route| match route {
            Route::Buffered(buffer) => Some(buffer),
            Route::Unbuffered => None,
        })
    }

    /// The number of packets still held by each non-empty buffer.
    #[must_use]
    pub fn pending(&self) -> BTreeMap<SourceId, usize> {
        self.routes
            .iter()
            .filter_map(|(source, route)| match route {
                Route::Buffered(buffer) if buffer.fill_level() > 0 => {
                    Some((source.clone(), buffer.fill_level()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.routes.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
