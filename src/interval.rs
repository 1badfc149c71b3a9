use std::fmt;

use chrono::{NaiveTime, Timelike};

const MAX_EXTRA_SECONDS: u8 = 59;

/// Repeating reminder interval: "every H hours and M minutes", plus up to 59
/// extra seconds. Only the hour and minute components of the stored
/// time-of-day are meaningful; seconds and nanoseconds are discarded at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderInterval {
    time_of_day: NaiveTime,
    extra_seconds: u8,
}

impl ReminderInterval {
    pub fn new(time_of_day: NaiveTime, extra_seconds: u8) -> Self {
        Self {
            time_of_day: normalize(time_of_day),
            extra_seconds: extra_seconds.min(MAX_EXTRA_SECONDS),
        }
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u8) -> Option<Self> {
        let time_of_day = NaiveTime::from_hms_opt(hours, minutes, 0)?;
        Some(Self::new(time_of_day, seconds))
    }

    pub fn set_time_of_day(&mut self, time_of_day: NaiveTime) {
        self.time_of_day = normalize(time_of_day);
    }

    pub fn set_extra_seconds(&mut self, extra_seconds: u8) {
        self.extra_seconds = extra_seconds.min(MAX_EXTRA_SECONDS);
    }

    pub fn time_of_day(&self) -> &NaiveTime {
        &self.time_of_day
    }

    pub fn extra_seconds(&self) -> u8 {
        self.extra_seconds
    }

    /// Total interval length in seconds. Zero is representable and is the
    /// scheduler's degenerate edge case.
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.time_of_day.hour()) * 3600
            + u64::from(self.time_of_day.minute()) * 60
            + u64::from(self.extra_seconds)
    }
}

impl Default for ReminderInterval {
    fn default() -> Self {
        Self {
            time_of_day: NaiveTime::MIN,
            extra_seconds: 0,
        }
    }
}

impl fmt::Display for ReminderInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hms(self.total_seconds()))
    }
}

fn normalize(time_of_day: NaiveTime) -> NaiveTime {
    time_of_day
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .expect("Zero is always in range.")
}

/// `HH:MM:SS` rendering of a second count, shared by the interval display and
/// the countdown surface.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = total_seconds % 3600 / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;

    #[test]
    fn total_seconds_sums_components() {
        let interval = ReminderInterval::from_hms(1, 30, 15).unwrap();
        assert_eq!(interval.total_seconds(), 5415);
    }

    #[test]
    fn zero_interval_is_representable() {
        let interval = ReminderInterval::from_hms(0, 0, 0).unwrap();
        assert_eq!(interval.total_seconds(), 0);
    }

    #[test]
    fn construction_discards_time_of_day_seconds() {
        let time = NaiveTime::from_hms_milli_opt(12, 34, 56, 789).unwrap();
        let interval = ReminderInterval::new(time, 10);

        assert_eq!(interval.total_seconds(), 12 * 3600 + 34 * 60 + 10);
    }

    #[test]
    fn setters_keep_the_interval_normalized() {
        let mut interval = ReminderInterval::default();

        interval.set_time_of_day(NaiveTime::from_hms_opt(2, 15, 30).unwrap());
        interval.set_extra_seconds(5);

        assert_eq!(interval.total_seconds(), 2 * 3600 + 15 * 60 + 5);
    }

    #[test]
    fn extra_seconds_are_clamped() {
        let mut interval = ReminderInterval::new(NaiveTime::MIN, 200);
        assert_eq!(interval.extra_seconds(), 59);

        interval.set_extra_seconds(61);
        assert_eq!(interval.extra_seconds(), 59);
    }

    #[test]
    fn from_hms_rejects_out_of_range_components() {
        assert!(ReminderInterval::from_hms(24, 0, 0).is_none());
        assert!(ReminderInterval::from_hms(0, 60, 0).is_none());
    }

    #[test]
    fn display_renders_hms() {
        let interval = ReminderInterval::from_hms(1, 30, 15).unwrap();
        assert_eq!(interval.to_string(), "01:30:15");
    }

    proptest! {
        #[test]
        fn total_seconds_is_pure_over_valid_domain(
            hours in 0u32..24,
            minutes in 0u32..60,
            seconds in 0u8..60
        ) {
            let interval = ReminderInterval::from_hms(hours, minutes, seconds).unwrap();

            prop_assert_eq!(
                interval.total_seconds(),
                u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds)
            );
        }

        #[test]
        fn construction_normalizes_any_time(
            time in arb::<NaiveTime>(),
            extra in any::<u8>()
        ) {
            let interval = ReminderInterval::new(time, extra);
            let expected = u64::from(time.hour()) * 3600
                + u64::from(time.minute()) * 60
                + u64::from(extra.min(59));

            prop_assert_eq!(interval.total_seconds(), expected);
            prop_assert!(interval.total_seconds() <= 23 * 3600 + 59 * 60 + 59);
        }
    }
}
