//! Simulated temperature sensors for the three rooms of the demo house.

pub mod config;
pub mod model;
pub mod rest;
