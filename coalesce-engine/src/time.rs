// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module represents the logical time during a simulation.

use std::rc::Rc;

use coalesce_track::entity::Entity;
use coalesce_track::set_time;

use crate::packet::Packet;
use crate::types::{SimError, SimResult, Time};

/// The overall owner of time within a simulation.
///
/// Time only moves forward and only to the arrival time of the next packet.
pub struct SimTime {
    pub entity: Rc<Entity>,
    now: Time,
}

impl SimTime {
    #[must_use]
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "time")),
            now: 0,
        }
    }

    /// Move time on to the arrival of `packet`.
    ///
    /// Fails if the packet arrives before the current time.
    pub fn advance_to(&mut self, packet: &Packet) -> SimResult {
        let time = packet.time();
        if time < self.now {
            return Err(SimError::Sequencing {
                time,
                now: self.now,
                source: packet.source().clone(),
            });
        }
        if time != self.now {
            set_time!(self.entity ; time);
            self.now = time;
        }
        Ok(())
    }

    #[must_use]
    pub fn now(&self) -> Time {
        self.now
    }
}
