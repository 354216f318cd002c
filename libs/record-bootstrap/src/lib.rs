//! Host bootstrap for the record server.
//!
//! Layered configuration, logging initialization, path utilities and signal
//! handling shared by the server binary.

pub mod config;
pub mod logging;
pub mod paths;
pub mod signals;

pub use config::*;
pub use logging::*;
pub use paths::{PathError, expand_tilde};
pub use signals::*;
