//! Countdown display value.

use std::fmt;

/// Remaining time of a reservation, floored to whole seconds and never negative.
///
/// Renders as `HH:MM:SS`. Hours wrap at 24; days are not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_secs(remaining_secs: u64) -> Self {
        Self { remaining_secs }
    }

    pub fn from_remaining(remaining: chrono::Duration) -> Self {
        // num_seconds truncates toward zero, which is a floor for positive values
        let secs = remaining.num_seconds();
        Self::from_secs(u64::try_from(secs).unwrap_or(0))
    }

    pub fn as_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_zero(&self) -> bool {
        self.remaining_secs == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = (self.remaining_secs / 3600) % 24;
        let minutes = (self.remaining_secs / 60) % 60;
        let seconds = self.remaining_secs % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case::one_minute(Duration::seconds(60), "00:01:00")]
    #[case::mixed(Duration::seconds(3 * 3600 + 25 * 60 + 7), "03:25:07")]
    #[case::sub_second_floors(Duration::milliseconds(59_999), "00:00:59")]
    #[case::zero(Duration::zero(), "00:00:00")]
    #[case::negative_clamps(Duration::seconds(-5), "00:00:00")]
    #[case::hours_wrap_at_a_day(Duration::hours(25) + Duration::seconds(1), "01:00:01")]
    fn renders_as_hh_mm_ss(#[case] remaining: Duration, #[case] expected: &str) {
        assert_eq!(Countdown::from_remaining(remaining).to_string(), expected);
    }

    #[test]
    fn half_a_second_left_is_displayed_as_zero() {
        let c = Countdown::from_remaining(Duration::milliseconds(500));
        assert!(c.is_zero());
    }
}
