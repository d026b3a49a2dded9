//! Telemetry intake service: accepts schema-free JSON readings and keeps them in memory.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod rest;
pub mod store;
