/// Safely convert a count to f64 for distance calculations
///
/// Counts here are bounded by sequence lengths, well within the exact
/// integer range of f64.
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Fraction of informative compared positions that are discordant.
///
/// Wildcards carry no information and are removed from the denominator.
/// With no informative position at all the distance is 1.0, the same as a
/// query that disagrees everywhere.
#[must_use]
pub fn distance(discordant: usize, span_len: u32, wildcard_count: u32) -> f64 {
    let informative = span_len.saturating_sub(wildcard_count);
    if informative == 0 {
        return 1.0;
    }
    count_to_f64(discordant) / f64::from(informative)
}

/// Format a fraction as a percentage, rounding half up.
///
/// Uses no decimals from 100% upwards, one decimal above 10% and two
/// decimals otherwise. The thresholds apply to the rounded value, so 99.996%
/// prints as `100%` rather than `100.0%`.
#[must_use]
pub fn format_percentage(fraction: f64) -> String {
    let percent = fraction * 100.0;
    let round = |decimals: i32| {
        let scale = 10f64.powi(decimals);
        (percent * scale + 0.5).floor() / scale
    };

    let (decimals, rounded) = if round(0) >= 100.0 {
        (0, round(0))
    } else if round(1) > 10.0 {
        (1, round(1))
    } else {
        (2, round(2))
    };
    #[allow(clippy::cast_sign_loss)]
    let precision = decimals as usize;
    format!("{rounded:.precision$}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert!((distance(0, 100, 0) - 0.0).abs() < f64::EPSILON);
        assert!((distance(5, 100, 0) - 0.05).abs() < 1e-12);
        // Wildcards shrink the denominator
        assert!((distance(5, 100, 50) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_distance_without_information() {
        assert!((distance(0, 0, 0) - 1.0).abs() < f64::EPSILON);
        assert!((distance(0, 10, 10) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_monotonic() {
        let mut previous = distance(0, 300, 12);
        for discordant in 1..=300 {
            let current = distance(discordant, 300, 12);
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn test_format_percentage_precision() {
        assert_eq!(format_percentage(0.0), "0.00%");
        assert_eq!(format_percentage(0.0123), "1.23%");
        assert_eq!(format_percentage(0.1), "10.00%");
        assert_eq!(format_percentage(0.1234), "12.3%");
        assert_eq!(format_percentage(1.0), "100%");
        assert_eq!(format_percentage(0.999_96), "100%");
        assert_eq!(format_percentage(0.9996), "100%");
        assert_eq!(format_percentage(0.100_51), "10.1%");
        assert_eq!(format_percentage(0.100_4), "10.04%");
        assert_eq!(format_percentage(0.099_96), "10.00%");
    }

    #[test]
    fn test_format_percentage_rounds_half_up() {
        // 31.25% is exact in binary; half-even would give 31.2%
        assert_eq!(format_percentage(0.3125), "31.3%");
        assert_eq!(format_percentage(0.000_256), "0.03%");
        assert_eq!(format_percentage(0.000_244), "0.02%");
    }
}
