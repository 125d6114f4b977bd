// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The `coalesce-sim` application.
//!
//! It has two sub-commands:
//!  - `generate` writes a seeded synthetic packet trace.
//!  - `run` simulates a packet trace through the configured routes and
//!    writes the resulting interrupt trace.
//!
//! See [config] for how the routes and generator are configured.

pub mod commands;
pub mod config;
pub mod error;
