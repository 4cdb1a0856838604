//! Relay and status-distribution services behind the HTTP handlers.

pub mod relay;
pub mod status;
