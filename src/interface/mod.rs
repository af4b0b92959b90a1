//! Interface layer: CLI entry, configuration and logging.

pub mod cli;
pub mod config;
pub mod logging;
