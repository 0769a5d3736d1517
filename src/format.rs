//! Compact number formatting for axis ticks and tooltips

/// Format a non-negative number with a K/M/B suffix and one decimal place.
///
/// Values below 1000 are printed as plain integers. Negative input is not
/// supported.
///
/// ```
/// use streamcharts::format_number;
///
/// assert_eq!(format_number(999.0), "999");
/// assert_eq!(format_number(1500.0), "1.5K");
/// assert_eq!(format_number(2_300_000.0), "2.3M");
/// assert_eq!(format_number(4_000_000_000.0), "4.0B");
/// ```
pub fn format_number(num: f64) -> String {
    if num >= 1e9 {
        format!("{:.1}B", num / 1e9)
    } else if num >= 1e6 {
        format!("{:.1}M", num / 1e6)
    } else if num >= 1e3 {
        format!("{:.1}K", num / 1e3)
    } else {
        format!("{}", num.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers_below_thousand() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(format_number(1000.0), "1.0K");
        assert_eq!(format_number(1500.0), "1.5K");
        assert_eq!(format_number(2_300_000.0), "2.3M");
        assert_eq!(format_number(4_000_000_000.0), "4.0B");
    }

    #[test]
    fn test_magnitude_boundaries() {
        // Suffix is picked from the unrounded value, so 999,999 stays in K
        assert_eq!(format_number(999_999.0), "1000.0K");
        assert_eq!(format_number(1_000_000.0), "1.0M");
        assert_eq!(format_number(999_999_999.0), "1000.0M");
        assert_eq!(format_number(1e9), "1.0B");
    }

    #[test]
    fn test_fractional_small_values_round() {
        assert_eq!(format_number(12.4), "12");
        assert_eq!(format_number(12.6), "13");
    }
}
