//! Configuration management for vortex.
//!
//! This module handles loading the TOML configuration file and resolving the
//! directories vortex reads from and writes to (config, data, logs, downloads).

pub mod file;
pub mod paths;

pub use file::VortexConfig;
