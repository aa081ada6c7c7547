//! CLI support
//!
//! Configuration file handling and logging setup used by the binaries.

pub mod config;
pub mod logging;
