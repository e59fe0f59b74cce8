/// Formats seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
///
/// Fractional seconds are truncated; negative input formats as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hrs = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    if hrs > 0 {
        format!("{hrs:02}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0.0, "00:00")]
    #[case::seconds_only(45.0, "00:45")]
    #[case::fraction_truncated(45.5, "00:45")]
    #[case::minutes(125.0, "02:05")]
    #[case::just_under_hour(3599.9, "59:59")]
    #[case::hours(3725.0, "01:02:05")]
    #[case::negative(-3.0, "00:00")]
    fn test_format_timestamp(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_timestamp(seconds), expected);
    }
}
