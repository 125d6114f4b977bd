// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! Everything outside the simulation core which produces or consumes traces.
//!
//!  - [csv] reads and writes packet traces and interrupt traces.
//!  - [generator] builds seeded synthetic packet traces.

pub mod csv;
pub mod error;
pub mod generator;
