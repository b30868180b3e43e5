//! Curlew - collection hierarchy and request ordering engine.
//!
//! This crate exposes the engine to a shell: a [`Command`] per operation, a
//! [`CommandHandler`] that runs them against the SQLite store, and a
//! line-delimited JSON server used by the `curlew` binary.

pub mod commands;
pub mod config;
pub mod logging;
pub mod server;

pub use commands::{Command, CommandHandler};
pub use config::{AppConfig, ConfigError};
pub use server::{Reply, dispatch, serve};
