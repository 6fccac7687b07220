//! Carbon-aware task scheduling over a CO2-intensity forecast.
//!
//! Given an hourly (or finer) forecast of grid carbon intensity, the crate
//! computes the CO2 footprint of running a task at a chosen start and finds
//! the start that minimizes it.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod io;
pub mod runner;
/// Impact calculation, start-time optimization, and aggregation.
pub mod schedule;
