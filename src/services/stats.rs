use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

/// Half-open bounds of a calendar week in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Week containing `now`, starting Sunday 00:00 UTC.
pub fn current_week(now: DateTime<Utc>) -> WeekBounds {
    let today = now.date_naive();
    let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let start = Utc.from_utc_datetime(&sunday.and_time(NaiveTime::default()));
    WeekBounds {
        start,
        end: start + Duration::days(7),
    }
}
