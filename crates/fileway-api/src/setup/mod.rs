//! Application setup: router construction and server startup.

pub mod routes;
pub mod server;
