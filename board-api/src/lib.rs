//! Board API Library
//!
//! Configuration, dependency wiring, error mapping and the HTTP router for the
//! anonymous board.

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Dependencies, LogFormat, Settings, StorageBackend};
pub use errors::{ApiError, StartupError};
