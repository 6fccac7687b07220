//! Error taxonomy for forecast validation and schedule computations.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the impact calculator, the schedule optimizer, and the
/// forecast boundary checks.
///
/// All variants are deterministic consequences of caller input or upstream
/// data; none are transient and none should be mapped to a zero footprint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The requested start timestamp is not a row of the forecast.
    #[error("start time {start} is not present in the forecast")]
    NotFound {
        /// Timestamp that was looked up.
        start: DateTime<Utc>,
    },

    /// The requested window needs more rows than the forecast holds.
    #[error("forecast horizon too short: window needs {required} samples, forecast has {available}")]
    InsufficientHorizon {
        /// Number of samples the window spans.
        required: usize,
        /// Number of samples in the forecast.
        available: usize,
    },

    /// The forecast violates an ordering, spacing, or value invariant.
    #[error("invalid forecast at row {index}: {reason}")]
    InvalidForecast {
        /// Row index where the violation was detected.
        index: usize,
        /// Human-readable description of the violated invariant.
        reason: String,
    },

    /// Duration is zero or not a whole number of forecast samples.
    #[error("invalid duration of {hours} h: {reason}")]
    InvalidDuration {
        /// Requested duration in hours.
        hours: u32,
        /// Why the duration was rejected.
        reason: String,
    },

    /// The appliance has no typical power draw and none was given.
    #[error("appliance \"{appliance}\" has no typical power draw; an explicit power_kw is required")]
    PowerRequired {
        /// Label of the appliance.
        appliance: String,
    },

    /// Power draw is not a strictly positive finite number.
    #[error("invalid power draw {power_kw} kW: must be finite and > 0")]
    InvalidPower {
        /// Rejected power draw (kW).
        power_kw: f64,
    },
}

impl ScheduleError {
    pub(crate) fn invalid_forecast(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidForecast {
            index,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for results carrying a [`ScheduleError`].
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn not_found_message_names_timestamp() {
        let start = Utc.with_ymd_and_hms(2024, 2, 20, 8, 0, 0).unwrap();
        let msg = ScheduleError::NotFound { start }.to_string();
        assert!(msg.contains("2024-02-20 08:00:00"), "got: {msg}");
    }

    #[test]
    fn insufficient_horizon_message_has_counts() {
        let msg = ScheduleError::InsufficientHorizon {
            required: 6,
            available: 5,
        }
        .to_string();
        assert!(msg.contains('6') && msg.contains('5'));
    }

    #[test]
    fn power_required_message_asks_for_power() {
        let msg = ScheduleError::PowerRequired {
            appliance: "Custom".to_string(),
        }
        .to_string();
        assert!(msg.contains("Custom") && msg.contains("power_kw"), "got: {msg}");
        assert!(!msg.contains("0 kW"));
    }
}
