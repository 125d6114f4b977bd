// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Unique identifiers

/// IDs that should be unique across the simulation
///
/// Each entity within the application is given a unique ID so that the
/// _log_/_trace_ events it emits can be attributed to it. There are two
/// reserved ID values: [NO_ID](crate::NO_ID) and [ROOT](crate::ROOT)
#[derive(Copy, Clone, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Id(pub u64);

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
