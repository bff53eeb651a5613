//! Checklist CLI
//!
//! Library half of the `checklist` binary: configuration file loading,
//! subscriber setup and the subcommand bodies. The binary only parses
//! arguments and prints.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
pub mod config;
pub mod logging;

// Re-exports
pub use commands::{check, compile, load_resolver, read_json, validate, CheckOutcome, CompileOutcome, FileCheck};
pub use config::CliConfig;
pub use logging::{init_logging, LogFormat};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
