//! Device registry service: device records in PostgreSQL behind a small REST API.

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod rest;
pub mod validate;
