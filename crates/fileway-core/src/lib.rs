//! Fileway Core Library
//!
//! Domain models, error types, configuration, and the progress-instrumented
//! byte stream shared across all Fileway crates.

pub mod config;
pub mod error;
pub mod models;
pub mod progress;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use progress::{ProgressCounter, ProgressObserver, ProgressStream};
