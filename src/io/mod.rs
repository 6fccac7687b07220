//! CSV import of forecasts and export of schedule results.

pub mod export;
pub mod forecast_csv;
