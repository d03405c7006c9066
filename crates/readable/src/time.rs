//! Durations and relative times in words.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 365 * DAY;

const UNITS: [(u64, &str); 7] = [
    (YEAR, "year"),
    (MONTH, "month"),
    (WEEK, "week"),
    (DAY, "day"),
    (HOUR, "hour"),
    (MINUTE, "minute"),
    (1, "second"),
];

/// Formats `span` in its largest whole unit, e.g. `2 hours` or `1 day`.
///
/// Sub-second durations read as `0 seconds`.
pub fn duration(span: Duration) -> String {
    let seconds = span.as_secs();
    let (size, name) = UNITS
        .iter()
        .copied()
        .find(|(size, _)| seconds >= *size)
        .unwrap_or((1, "second"));
    let count = seconds / size;
    if count == 1 {
        format!("1 {name}")
    } else {
        format!("{count} {name}s")
    }
}

/// Describes `instant` relative to `now`: `now`, `5 minutes ago` or
/// `in 3 days`.
pub fn time_ago(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(instant);
    let past = delta >= TimeDelta::zero();
    let magnitude = delta.abs().to_std().unwrap_or_default();
    if magnitude.as_secs() == 0 {
        return "now".to_string();
    }

    let amount = duration(magnitude);
    if past {
        format!("{amount} ago")
    } else {
        format!("in {amount}")
    }
}

/// [`time_ago`] measured from the current clock.
pub fn relative(instant: DateTime<Utc>) -> String {
    time_ago(instant, Utc::now())
}

/// `true` once the current clock has reached `instant`.
pub fn is_in_past(instant: DateTime<Utc>) -> bool {
    Utc::now() >= instant
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn duration_uses_the_largest_whole_unit() {
        assert_eq!(duration(Duration::from_secs(0)), "0 seconds");
        assert_eq!(duration(Duration::from_millis(1500)), "1 second");
        assert_eq!(duration(Duration::from_secs(45)), "45 seconds");
        assert_eq!(duration(Duration::from_secs(2 * HOUR + 59 * MINUTE)), "2 hours");
        assert_eq!(duration(Duration::from_secs(DAY)), "1 day");
        assert_eq!(duration(Duration::from_secs(15 * DAY)), "2 weeks");
        assert_eq!(duration(Duration::from_secs(400 * DAY)), "1 year");
    }

    #[test]
    fn time_ago_describes_past_and_future() {
        let now = at(0);
        assert_eq!(time_ago(now, now), "now");
        assert_eq!(time_ago(at(-300), now), "5 minutes ago");
        assert_eq!(time_ago(at(3 * DAY as i64), now), "in 3 days");
        assert_eq!(time_ago(at(-1), now), "1 second ago");
    }

    #[test]
    fn past_check_uses_the_clock() {
        assert!(is_in_past(Utc::now() - TimeDelta::seconds(1)));
        assert!(!is_in_past(Utc::now() + TimeDelta::hours(1)));
        assert_eq!(relative(Utc::now() - TimeDelta::hours(2)), "2 hours ago");
    }
}
