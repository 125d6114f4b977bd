// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Application configuration.
//!
//! The configuration is built from several sources. Later sources override
//! earlier ones:
//!  1. the built-in defaults, which model the reference NIC.
//!  2. an optional TOML file.
//!  3. environment variables prefixed with `COALESCE_`. Nested keys are
//!     separated with `__`, for example `COALESCE_GENERATOR__SEED=7`.
//!  4. command-line options, applied by the caller.
//!
//! An example TOML file:
//! ```toml
//! end_of_run = "flush"
//!
//! [generator]
//! seed = 3
//! num_packets = 1000
//! max_time = 500
//! sources = [
//!     { id = "127.0.0.1", probability = 0.5 },
//!     { id = "127.0.0.2", probability = 0.5 },
//! ]
//!
//! [routes."127.0.0.1"]
//! policy = "unbuffered"
//!
//! [routes."127.0.0.2"]
//! policy = "buffered"
//! packet_limit = 4
//! time_limit = 20
//! ```

use std::path::Path;

use coalesce_engine::config::{RoutingConfig, reference_routes};
use coalesce_engine::engine::EndOfRun;
use coalesce_trace::generator::GeneratorConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ENV_PREFIX: &str = "COALESCE_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// The route for each source. When no routes are configured at all the
    /// reference routes are used. Configured routes replace them entirely.
    #[serde(default)]
    pub routes: RoutingConfig,

    #[serde(default)]
    pub end_of_run: EndOfRun,
}

impl SimConfig {
    /// Merge the defaults, the optional `conf_file` and the environment.
    pub fn load(conf_file: Option<&Path>) -> Result<Self, AppError> {
        let mut figment = Figment::new().merge(Serialized::defaults(SimConfig::default()));
        if let Some(conf_file) = conf_file {
            if !conf_file.is_file() {
                return Err(AppError::MissingConfig(conf_file.to_path_buf()));
            }
            figment = figment.merge(Toml::file(conf_file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: SimConfig = figment.extract()?;
        if config.routes.is_empty() {
            config.routes = reference_routes();
        }
        Ok(config)
    }
}
