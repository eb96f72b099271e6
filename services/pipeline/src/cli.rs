//! Command-line surface

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// CSV-driven limit order matching engine
#[derive(Debug, Parser)]
#[command(name = "pipeline", about = "A matching engine for order event streams")]
pub struct Cli {
    /// Input CSV of order events
    pub order_input_file: PathBuf,

    /// Output CSV for result records
    pub order_result_output_file: PathBuf,

    /// Verbosity of diagnostic logging
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log destination; empty or "none" logs to stdout
    #[arg(long, default_value = "")]
    pub log_file: String,

    /// Capacity of the event queue between reader and dispatcher
    #[arg(long, default_value_t = 100_000)]
    pub queue_size: usize,
}

/// Log verbosity levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Off,
}

impl LogLevel {
    /// Map to a tracing level filter; `critical` collapses into ERROR,
    /// tracing's most severe level.
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}
