//! Schedule parsing: natural-language time phrases to [`ExecuteAt`].
//!
//! Recognised forms, tried in precedence order:
//!
//! | # | Form | Effect |
//! |---|------|--------|
//! | 1 | `YYYY-MM-DD HH:MM` | absolute datetime; everything else is skipped |
//! | 2 | `repeat` / `every`, `in` / `after` | repeatable / delayed flags |
//! | 3 | `N hour(s)`, `N minute(s)`, `HH:MM` | offsets; hour-only becomes minutes; `HH:MM` overrides |
//! | 4 | `monday` … `sunday` | days until the next such weekday (0 if today) |
//! | 5 | `N day(s)` | day offset, only without a weekday |
//!
//! Delayed and repeatable schedules are resolved to a concrete datetime at
//! parse time; others are resolved on demand by [`ExecuteAt::datetime_at`].

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::id::ScheduleId;
use crate::time::Timestamp;

static ABSOLUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2})\b").expect("valid regex"));
static REPEATABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:repeat|every)\b").expect("valid regex"));
static DELAYED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:in|after)\b").expect("valid regex"));
static HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*hours?\b").expect("valid regex"));
static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*(?:minutes?|mins?)\b").expect("valid regex"));
static EXACT_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid regex"));
static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("valid regex")
});
static DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*days?\b").expect("valid regex"));

/// Why a phrase could not be turned into a schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleParseError {
    #[error("number `{0}` is out of range")]
    InvalidNumber(String),

    #[error("invalid datetime `{0}`")]
    InvalidDatetime(String),

    #[error("invalid time of day {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
}

/// A resolved point in time or recurrence.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteAt {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub weekday: Option<Weekday>,
    pub is_repeatable: bool,
    pub is_delayed: bool,
    pub is_exact_hours: bool,
    pub exact_datetime: Option<Timestamp>,
}

impl ExecuteAt {
    /// Parse `text` against the current time.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::parse_at(text, crate::time::now())
    }

    /// Parse `text` as if the current time were `now`.
    ///
    /// Malformed numbers or dates produce an empty schedule and a warning.
    #[must_use]
    pub fn parse_at(text: &str, now: Timestamp) -> Self {
        match Self::try_parse_at(text, now) {
            Ok(at) => at,
            Err(err) => {
                tracing::warn!(%err, text, "failed to parse schedule");
                Self::default()
            }
        }
    }

    /// Parse `text` as if the current time were `now`, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleParseError`] when a numeric group overflows or the
    /// absolute date/time does not exist.
    pub fn try_parse_at(text: &str, now: Timestamp) -> Result<Self, ScheduleParseError> {
        let mut at = Self::default();

        if let Some(caps) = ABSOLUTE.captures(text) {
            let raw = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
            let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M")
                .map_err(|_| ScheduleParseError::InvalidDatetime(raw.clone()))?;
            at.exact_datetime = Some(Utc.from_utc_datetime(&naive));
            return Ok(at);
        }

        at.is_repeatable = REPEATABLE.is_match(text);
        at.is_delayed = DELAYED.is_match(text);

        let hours = capture_number(&HOURS, text)?;
        let minutes = capture_number(&MINUTES, text)?;
        match (hours, minutes) {
            (Some(h), None) => {
                at.minutes = h
                    .checked_mul(60)
                    .ok_or_else(|| ScheduleParseError::InvalidNumber(h.to_string()))?;
            }
            (h, m) => {
                at.hours = h.unwrap_or(0);
                at.minutes = m.unwrap_or(0);
            }
        }

        if let Some(caps) = EXACT_TIME.captures(text) {
            let hour = parse_number(&caps[1])?;
            let minute = parse_number(&caps[2])?;
            if hour > 23 || minute > 59 {
                return Err(ScheduleParseError::InvalidTime { hour, minute });
            }
            at.hours = hour;
            at.minutes = minute;
            at.is_exact_hours = true;
        }

        if let Some(caps) = WEEKDAY.captures(text) {
            let weekday: Weekday = caps[1]
                .parse()
                .map_err(|_| ScheduleParseError::InvalidDatetime(caps[1].to_string()))?;
            let today = now.weekday().num_days_from_monday();
            let target = weekday.num_days_from_monday();
            at.days = (target + 7 - today) % 7;
            at.weekday = Some(weekday);
        } else if let Some(days) = capture_number(&DAYS, text)? {
            at.days = days;
        }

        let resolved = at.compute(now).ok_or_else(|| at.out_of_range())?;
        if at.is_delayed || at.is_repeatable {
            at.exact_datetime = Some(resolved);
        }
        Ok(at)
    }

    /// `true` when no offset, weekday or datetime was recognised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.weekday.is_none()
            && self.exact_datetime.is_none()
    }

    /// Resolve the schedule to a concrete datetime relative to `now`.
    ///
    /// A datetime pre-resolved at parse time is returned unchanged. Offsets
    /// past the representable range saturate to the latest instant.
    #[must_use]
    pub fn datetime_at(&self, now: Timestamp) -> Timestamp {
        self.exact_datetime
            .or_else(|| self.compute(now))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Resolve the schedule against the current time.
    #[must_use]
    pub fn datetime(&self) -> Timestamp {
        self.datetime_at(crate::time::now())
    }

    /// Total relative offset described by days/hours/minutes.
    #[must_use]
    pub fn offset(&self) -> Duration {
        Duration::days(i64::from(self.days))
            + Duration::hours(i64::from(self.hours))
            + Duration::minutes(i64::from(self.minutes))
    }

    fn compute(&self, now: Timestamp) -> Option<Timestamp> {
        let base = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        if !self.is_exact_hours {
            return base.checked_add_signed(self.offset());
        }
        let date = base
            .date_naive()
            .checked_add_days(Days::new(u64::from(self.days)))?;
        let Some(naive) = date.and_hms_opt(self.hours, self.minutes, 0) else {
            return Some(base);
        };
        let at = Utc.from_utc_datetime(&naive);
        // A bare "at HH:MM" that already passed today means tomorrow.
        if at <= now && self.days == 0 && self.weekday.is_none() {
            at.checked_add_days(Days::new(1))
        } else {
            Some(at)
        }
    }

    fn out_of_range(&self) -> ScheduleParseError {
        let largest = [self.days, self.hours, self.minutes]
            .into_iter()
            .max()
            .unwrap_or_default();
        ScheduleParseError::InvalidNumber(largest.to_string())
    }
}

impl fmt::Display for ExecuteAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_delayed
            && !self.is_repeatable
            && self.offset().is_zero()
            && self.weekday.is_none()
            && let Some(dt) = self.exact_datetime
        {
            return write!(f, "{}", dt.format("%Y-%m-%d %H:%M"));
        }

        let mut words: Vec<String> = Vec::new();
        if self.is_repeatable {
            words.push(if self.is_delayed { "repeat" } else { "every" }.to_string());
        }
        if self.is_delayed {
            words.push("in".to_string());
        }
        if let Some(weekday) = self.weekday {
            words.push(weekday_name(weekday).to_string());
        }

        let mut offsets = Vec::new();
        if self.weekday.is_none() && self.days > 0 {
            offsets.push(plural(self.days, "day"));
        }
        if !self.is_exact_hours {
            if self.hours > 0 {
                offsets.push(plural(self.hours, "hour"));
            }
            if self.minutes > 0 {
                offsets.push(plural(self.minutes, "minute"));
            }
        }
        if !offsets.is_empty() {
            words.push(offsets.join(" and "));
        }
        if self.is_exact_hours {
            words.push(format!("at {:02}:{:02}", self.hours, self.minutes));
        }
        f.write_str(&words.join(" "))
    }
}

fn capture_number(re: &Regex, text: &str) -> Result<Option<u32>, ScheduleParseError> {
    re.captures(text)
        .map(|caps| parse_number(&caps[1]))
        .transpose()
}

fn parse_number(raw: &str) -> Result<u32, ScheduleParseError> {
    raw.parse()
        .map_err(|_| ScheduleParseError::InvalidNumber(raw.to_string()))
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A command queued for later execution on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub id: ScheduleId,
    pub channel: String,
    pub user: String,
    pub command: String,
    pub execute_at: ExecuteAt,
    pub next_run: Timestamp,
}

impl ScheduledItem {
    /// Queue `command` to run at the time described by `execute_at`.
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        command: impl Into<String>,
        execute_at: ExecuteAt,
        now: Timestamp,
    ) -> Self {
        let next_run = execute_at.datetime_at(now);
        Self {
            id: ScheduleId::new(),
            channel: channel.into(),
            user: user.into(),
            command: command.into(),
            execute_at,
            next_run,
        }
    }

    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_run <= now
    }

    /// The run after `next_run` for repeatable items; `None` for one-shots
    /// and for steps that would leave the representable range.
    #[must_use]
    pub fn following_run(&self) -> Option<Timestamp> {
        if !self.execute_at.is_repeatable {
            return None;
        }
        let step = if self.execute_at.weekday.is_some() {
            Duration::days(7)
        } else if self.execute_at.is_exact_hours {
            Duration::days(i64::from(self.execute_at.days.max(1)))
        } else {
            self.execute_at.offset()
        };
        if step.is_zero() {
            return None;
        }
        self.next_run.checked_add_signed(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wednesday 2026-10-14 08:30:15 UTC.
    fn wednesday() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 14, 8, 30, 15).unwrap()
    }

    fn minute(ts: Timestamp) -> Timestamp {
        ts.with_second(0).unwrap().with_nanosecond(0).unwrap()
    }

    #[test]
    fn should_parse_absolute_datetime_and_skip_the_rest() {
        let at = ExecuteAt::parse_at("every 2026-12-01 10:30 in 5 minutes", wednesday());
        assert_eq!(
            at.exact_datetime,
            Some(Utc.with_ymd_and_hms(2026, 12, 1, 10, 30, 0).unwrap())
        );
        assert!(!at.is_repeatable);
        assert!(!at.is_delayed);
        assert_eq!(at.minutes, 0);
        assert_eq!(at.to_string(), "2026-12-01 10:30");
    }

    #[test]
    fn should_parse_hours_and_minutes_offset() {
        let now = wednesday();
        let at = ExecuteAt::parse_at("in 1 hour and 2 minutes", now);
        assert!(at.is_delayed);
        assert_eq!((at.hours, at.minutes), (1, 2));
        assert_eq!(
            at.datetime_at(now),
            minute(now) + Duration::hours(1) + Duration::minutes(2)
        );
        assert_eq!(at.to_string(), "in 1 hour and 2 minutes");
    }

    #[test]
    fn should_convert_hour_only_input_to_minutes() {
        let at = ExecuteAt::parse_at("in 2 hours", wednesday());
        assert_eq!(at.hours, 0);
        assert_eq!(at.minutes, 120);
        assert_eq!(at.to_string(), "in 120 minutes");
    }

    #[test]
    fn should_resolve_weekday_to_upcoming_day() {
        let now = wednesday();
        let at = ExecuteAt::parse_at("Sunday at 10:00", now);
        assert_eq!(at.weekday, Some(Weekday::Sun));
        assert_eq!(at.days, 4);
        assert!(at.is_exact_hours);
        assert!(at.exact_datetime.is_none());
        assert_eq!(
            at.datetime_at(now),
            Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap()
        );
        assert_eq!(at.to_string(), "sunday at 10:00");
    }

    #[test]
    fn should_use_zero_days_when_weekday_is_today() {
        let at = ExecuteAt::parse_at("wednesday at 09:00", wednesday());
        assert_eq!(at.days, 0);
    }

    #[test]
    fn should_parse_repeatable_weekday_with_exact_time() {
        let now = wednesday();
        let at = ExecuteAt::parse_at("every monday at 9:10", now);
        assert!(at.is_repeatable);
        assert_eq!(at.weekday, Some(Weekday::Mon));
        assert_eq!((at.hours, at.minutes), (9, 10));
        assert_eq!(
            at.exact_datetime,
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 9, 10, 0).unwrap())
        );
        assert_eq!(at.to_string(), "every monday at 09:10");
    }

    #[test]
    fn should_let_exact_time_override_offsets() {
        let at = ExecuteAt::parse_at("in 3 hours at 14:45", wednesday());
        assert!(at.is_exact_hours);
        assert_eq!((at.hours, at.minutes), (14, 45));
    }

    #[test]
    fn should_parse_day_offset_without_weekday() {
        let now = wednesday();
        let at = ExecuteAt::parse_at("after 2 days", now);
        assert_eq!(at.days, 2);
        assert_eq!(at.exact_datetime, Some(minute(now) + Duration::days(2)));
    }

    #[test]
    fn should_prefer_weekday_over_day_offset() {
        let at = ExecuteAt::parse_at("friday in 5 days", wednesday());
        assert_eq!(at.weekday, Some(Weekday::Fri));
        assert_eq!(at.days, 2);
    }

    #[test]
    fn should_roll_bare_time_to_tomorrow_when_passed() {
        let now = wednesday();
        let at = ExecuteAt::parse_at("at 07:00", now);
        assert_eq!(
            at.datetime_at(now),
            Utc.with_ymd_and_hms(2026, 10, 15, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn should_return_empty_for_unrecognised_text() {
        let at = ExecuteAt::parse_at("whenever you like", wednesday());
        assert!(at.is_empty());
        assert_eq!(at.to_string(), "");
    }

    #[test]
    fn should_return_empty_on_numeric_overflow() {
        let at = ExecuteAt::parse_at("in 99999999999 minutes", wednesday());
        assert!(at.is_empty());
    }

    #[test]
    fn should_return_empty_on_invalid_calendar_date() {
        let at = ExecuteAt::parse_at("2026-13-40 10:00", wednesday());
        assert!(at.is_empty());
        assert!(ExecuteAt::try_parse_at("2026-13-40 10:00", wednesday()).is_err());
    }

    #[test]
    fn should_reject_invalid_time_of_day() {
        let result = ExecuteAt::try_parse_at("at 25:61", wednesday());
        assert_eq!(
            result,
            Err(ScheduleParseError::InvalidTime {
                hour: 25,
                minute: 61
            })
        );
    }

    #[test]
    fn should_reparse_display_into_same_fields() {
        let now = wednesday();
        let at = ExecuteAt::parse_at("repeat in 3 days and 4 hours and 5 minutes", now);
        let again = ExecuteAt::parse_at(&at.to_string(), now);
        assert_eq!(at, again);
    }

    #[test]
    fn should_advance_repeatable_weekday_item_by_a_week() {
        let now = wednesday();
        let item = ScheduledItem::new(
            "C1",
            "U1",
            "hello",
            ExecuteAt::parse_at("every monday at 9:10", now),
            now,
        );
        assert_eq!(item.following_run(), Some(item.next_run + Duration::days(7)));
    }

    #[test]
    fn should_not_advance_one_shot_item() {
        let now = wednesday();
        let item = ScheduledItem::new(
            "C1",
            "U1",
            "hello",
            ExecuteAt::parse_at("in 5 minutes", now),
            now,
        );
        assert!(!item.is_due(now));
        assert!(item.is_due(now + Duration::minutes(5)));
        assert!(item.following_run().is_none());
    }

    #[test]
    fn should_reject_offsets_past_the_calendar() {
        let now = wednesday();
        assert_eq!(
            ExecuteAt::try_parse_at("in 999999999 days", now),
            Err(ScheduleParseError::InvalidNumber("999999999".to_string()))
        );
        assert!(ExecuteAt::parse_at("in 999999999 days", now).is_empty());
        assert!(ExecuteAt::parse_at("every 4000000000 days", now).is_empty());
        assert!(ExecuteAt::parse_at("999999999 days at 10:00", now).is_empty());
    }

    #[test]
    fn should_saturate_unresolved_offset_past_the_calendar() {
        let at = ExecuteAt {
            days: u32::MAX,
            ..ExecuteAt::default()
        };
        assert_eq!(at.datetime_at(wednesday()), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn should_stop_repeating_when_next_run_leaves_the_calendar() {
        let mut item = ScheduledItem::new(
            "C1",
            "U1",
            "hello",
            ExecuteAt::parse_at("every 5 minutes", wednesday()),
            wednesday(),
        );
        item.next_run = DateTime::<Utc>::MAX_UTC;
        assert!(item.following_run().is_none());
    }
}
