//! Configuration management for the puzzle solver

pub mod settings;

pub use settings::{
    CliOverrides, InputConfig, LoggingConfig, OutputConfig, OutputFormat, Settings, SolverBackend, SolverConfig,
};
