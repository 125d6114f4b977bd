// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Named parts of a simulation.
//!
//! Every part that logs owns an [Entity]. Entities form a tree below a single
//! [toplevel] entity and are named by their path from it, for example
//! `top::nic::127.0.0.2`.

use std::fmt;
use std::rc::Rc;

use crate::{Id, Tracker, create, destroy};

const SEPARATOR: &str = "::";

/// A node in the entity tree.
pub struct Entity {
    /// Name relative to the parent.
    pub name: String,

    /// Only the top-level entity has no parent.
    pub parent: Option<Rc<Entity>>,

    /// Identifies this entity in track events.
    pub id: Id,

    /// Where this entity's events are sent.
    pub tracker: Tracker,

    path: String,
}

impl Entity {
    /// Create an entity below `parent`, sharing its tracker.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self::register(Some(parent.clone()), &parent.tracker, name)
    }

    fn register(parent: Option<Rc<Entity>>, tracker: &Tracker, name: &str) -> Self {
        let path = match &parent {
            Some(parent) => format!("{}{SEPARATOR}{name}", parent.path),
            None => name.to_string(),
        };
        let id = tracker.unique_id();
        tracker.add_entity(id, &path);

        let entity = Self {
            name: name.to_string(),
            parent,
            id,
            tracker: tracker.clone(),
            path,
        };
        create!(entity);
        entity
    }

    /// The `::` separated path from the top-level entity.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.path
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        destroy!(self);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.path, self.id)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Create the root of an entity tree.
pub fn toplevel(tracker: &Tracker, name: &str) -> Rc<Entity> {
    Rc::new(Entity::register(None, tracker, name))
}
