//! Carbon-intensity forecast tables and synthetic forecast sources.
//!
//! A [`ForecastTable`] is produced once per prediction run by an external
//! pipeline (or by [`SyntheticIntensity`] in demos) and is read-only for the
//! rest of the crate.

/// Seeded diurnal intensity generator.
pub mod synthetic;
pub mod table;

pub use synthetic::SyntheticIntensity;
pub use table::{ForecastPoint, ForecastTable, slot_timestamp};
