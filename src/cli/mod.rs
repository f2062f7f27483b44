//! CLI module for raggate
//!
//! Handles command-line argument parsing and configuration management.

pub mod args;
pub mod config;

pub use args::{
    AblateArgs, AskArgs, Cli, Commands, EvalArgs, GateCommand, IngestArgs, MonitorArgs,
    ReliabilityArgs,
};
pub use config::{EvalConfig, LlmConfig, PathsConfig};
