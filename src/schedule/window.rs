//! Sliding-window sums over an intensity series.
//!
//! Every window is summed directly from its own slice, left to right. Two
//! windows holding the same values therefore produce the same bits, and the
//! sum for a start index matches whatever the impact calculator computes for
//! that start.

/// Sums of every full window of `samples` rows, in start-index order.
///
/// Yields `len - samples + 1` values, or none when `samples` is zero or larger
/// than the series.
///
/// # Examples
///
/// ```
/// use co2_scheduler::schedule::window::window_sums;
///
/// let sums = window_sums(&[100.0, 50.0, 200.0, 30.0, 60.0], 2);
/// assert_eq!(sums, vec![150.0, 250.0, 230.0, 90.0]);
/// ```
pub fn window_sums(intensities: &[f64], samples: usize) -> Vec<f64> {
    if samples == 0 || samples > intensities.len() {
        return Vec::new();
    }

    intensities
        .windows(samples)
        .map(|w| w.iter().sum())
        .collect()
}

/// Sum of `[start, start + samples)`, clipped at the end of the series.
///
/// A window that runs past the last row sums only the rows that exist; a
/// start beyond the series sums nothing.
pub fn clipped_sum(intensities: &[f64], start: usize, samples: usize) -> f64 {
    let end = start.saturating_add(samples).min(intensities.len());
    intensities
        .get(start..end)
        .map_or(0.0, |w| w.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES: [f64; 5] = [100.0, 50.0, 200.0, 30.0, 60.0];

    #[test]
    fn full_length_window_is_single_sum() {
        assert_eq!(window_sums(&SERIES, 5), vec![440.0]);
    }

    #[test]
    fn oversized_or_zero_window_is_empty() {
        assert!(window_sums(&SERIES, 6).is_empty());
        assert!(window_sums(&SERIES, 0).is_empty());
        assert!(window_sums(&[], 1).is_empty());
    }

    #[test]
    fn clipped_sum_stops_at_table_end() {
        assert_eq!(clipped_sum(&SERIES, 3, 4), 90.0);
        assert_eq!(clipped_sum(&SERIES, 4, 1), 60.0);
        assert_eq!(clipped_sum(&SERIES, 9, 2), 0.0);
    }

    #[test]
    fn clipped_sum_matches_window_sums_inside_horizon() {
        let sums = window_sums(&SERIES, 3);
        for (i, &s) in sums.iter().enumerate() {
            assert_eq!(clipped_sum(&SERIES, i, 3).to_bits(), s.to_bits());
        }
    }
}
