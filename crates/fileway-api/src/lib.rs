//! Fileway API
//!
//! HTTP surface of the upload relay: record creation, the streaming
//! transfer endpoint, the live status stream, and download passthrough.

pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
