// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Generate packet traces and simulate NIC interrupt coalescing.
//!
//! See `lib.rs` for details.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coalesce_engine::engine::EndOfRun;
use coalesce_sim::commands::{generate, simulate};
use coalesce_sim::config::SimConfig;
use coalesce_sim::error::AppError;
use coalesce_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use coalesce_track::entity::toplevel;
use coalesce_track::{Tracker, warn};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "NIC interrupt coalescing simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingArgs,
}

#[derive(Args)]
struct LoggingArgs {
    /// Enable logging to the console.
    #[arg(long, global = true, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, global = true, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, global = true, default_value = "")]
    stdout_filter_regex: String,

    /// Write a log to this file.
    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Level of log message to write to `--log-file`.
    #[arg(long, global = true, default_value = "Trace")]
    log_file_level: log::Level,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic packet trace.
    Generate {
        /// The packet trace file to write.
        #[arg(long)]
        output: PathBuf,

        /// Override the configured random seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured number of packets.
        #[arg(long)]
        num_packets: Option<usize>,
    },

    /// Simulate a packet trace and write the interrupt trace.
    Run {
        /// The packet trace file to read.
        #[arg(long)]
        input: PathBuf,

        /// The interrupt trace file to write.
        #[arg(long)]
        output: PathBuf,

        /// Flush packets still buffered when the input ends rather than
        /// dropping them.
        #[arg(long)]
        flush_at_end: bool,
    },
}

fn build_tracker(args: &LoggingArgs) -> Result<Tracker, AppError> {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: args.stdout,
            level: args.stdout_level,
            filter_regex: &args.stdout_filter_regex,
            file: None,
        },
        log_file: TrackerConfig {
            enable: args.log_file.is_some(),
            level: args.log_file_level,
            filter_regex: "",
            file: args.log_file.as_deref(),
        },
    };
    Ok(setup_trackers(&config)?)
}

fn execute(tracker: &Tracker, cli: Cli) -> Result<(), AppError> {
    let mut config = SimConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Generate {
            output,
            seed,
            num_packets,
        } => {
            if let Some(seed) = seed {
                config.generator.seed = seed;
            }
            if let Some(num_packets) = num_packets {
                config.generator.num_packets = num_packets;
            }
            generate(tracker, &config, &output)?;
        }
        Command::Run {
            input,
            output,
            flush_at_end,
        } => {
            if flush_at_end {
                config.end_of_run = EndOfRun::Flush;
            }
            let report = simulate(tracker, &config, &input, &output)?;
            if report.packets_dropped() > 0 {
                let top = toplevel(tracker, "summary");
                warn!(top ; "{} packets were still buffered at time {} and raised no interrupt",
                    report.packets_dropped(), report.end_time);
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let tracker = build_tracker(&cli.logging)?;

    let result = execute(&tracker, cli);
    tracker.shutdown();
    result
}
