//! Daily activation times and next-event calculations.
//!
//! The scheduler works with wall-clock times in the local timezone. Every
//! calculation here is generic over the timezone so it can be exercised with
//! fixed offsets and DST-observing zones in tests, while production code passes
//! `chrono::Local` times.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

/// A wall-clock time of day at which a scheduled action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActivationTime(NaiveTime);

impl ActivationTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse `HH:MM` (24-hour). `HH:MM:SS` is accepted as well.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self)
            .with_context(|| format!("Invalid time '{input}', expected HH:MM (24-hour)"))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ActivationTime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ActivationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

/// The two kinds of scheduled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    /// Run the toggle command to bring the nightlight on.
    Enable,
    /// Force the daemon back to daylight temperature.
    Disable,
}

impl ScheduledEvent {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScheduledEvent::Enable => "enable",
            ScheduledEvent::Disable => "disable",
        }
    }
}

impl fmt::Display for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An upcoming event together with the instant it is due.
#[derive(Debug, Clone, PartialEq)]
pub struct NextEvent<Tz: TimeZone> {
    pub event: ScheduledEvent,
    pub at: DateTime<Tz>,
}

/// The configured daily schedule: an enable time and an optional disable time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub enable: ActivationTime,
    pub disable: Option<ActivationTime>,
}

impl Schedule {
    pub fn new(enable: ActivationTime, disable: Option<ActivationTime>) -> Self {
        Self { enable, disable }
    }

    /// Find the nearest upcoming event after `now`.
    ///
    /// Both configured events are candidates; the earliest wins. If they fall on
    /// the same instant the enable event is chosen.
    pub fn next_event<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NextEvent<Tz> {
        let enable = NextEvent {
            event: ScheduledEvent::Enable,
            at: next_occurrence(now, self.enable),
        };

        match self.disable {
            Some(disable_time) => {
                let disable_at = next_occurrence(now, disable_time);
                if disable_at < enable.at {
                    NextEvent {
                        event: ScheduledEvent::Disable,
                        at: disable_at,
                    }
                } else {
                    enable
                }
            }
            None => enable,
        }
    }
}

/// Compute the next occurrence of `at` strictly after `now`.
///
/// Today's occurrence when `now` is still before it, otherwise tomorrow's.
/// Rolls over midnight correctly: at 23:59 a target of 00:30 is 31 minutes away.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: ActivationTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    let candidate = resolve_local(&tz, today.and_time(at.time()));
    if candidate > *now {
        return candidate;
    }

    let tomorrow = today + ChronoDuration::days(1);
    resolve_local(&tz, tomorrow.and_time(at.time()))
}

/// Map a local wall-clock time onto the timezone.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times that
/// do not exist (clocks springing forward) move to the first valid minute after
/// the gap.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let mut probe = naive;
            // DST gaps never exceed a few hours
            for _ in 0..(4 * 60) {
                probe += ChronoDuration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return dt;
                }
            }
            tz.from_utc_datetime(&naive)
        }
    }
}

/// Time to sleep from `now` until `target`, never negative.
///
/// A target that is already due yields a zero duration so the caller proceeds
/// immediately.
pub fn sleep_duration<Tz: TimeZone>(now: &DateTime<Tz>, target: &DateTime<Tz>) -> StdDuration {
    target
        .clone()
        .signed_duration_since(now.clone())
        .to_std()
        .unwrap_or(StdDuration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, Utc};
    use chrono_tz::America::New_York;
    use proptest::prelude::*;

    fn at(hour: u32, minute: u32) -> ActivationTime {
        ActivationTime::new(hour, minute).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_activation_time() {
        assert_eq!(ActivationTime::parse("20:00").unwrap(), at(20, 0));
        assert_eq!(ActivationTime::parse(" 07:05 ").unwrap(), at(7, 5));
        assert_eq!(
            ActivationTime::parse("19:30:15").unwrap().time(),
            NaiveTime::from_hms_opt(19, 30, 15).unwrap()
        );
        assert_eq!("00:30".parse::<ActivationTime>().unwrap(), at(0, 30));
    }

    #[test]
    fn test_parse_activation_time_rejects_invalid() {
        for input in ["24:00", "7pm", "", "12:60", "20"] {
            assert!(ActivationTime::parse(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_activation_time_display() {
        assert_eq!(at(7, 5).to_string(), "07:05");
        assert_eq!(ActivationTime::parse("19:30:15").unwrap().to_string(), "19:30:15");
    }

    #[test]
    fn test_next_occurrence_later_today() {
        let now = utc(2026, 3, 1, 18, 0);
        assert_eq!(next_occurrence(&now, at(20, 0)), utc(2026, 3, 1, 20, 0));
    }

    #[test]
    fn test_next_occurrence_already_passed_targets_tomorrow() {
        let now = utc(2026, 3, 1, 21, 0);
        assert_eq!(next_occurrence(&now, at(20, 0)), utc(2026, 3, 2, 20, 0));
    }

    #[test]
    fn test_next_occurrence_exactly_now_targets_tomorrow() {
        let now = utc(2026, 3, 1, 20, 0);
        assert_eq!(next_occurrence(&now, at(20, 0)), utc(2026, 3, 2, 20, 0));
    }

    #[test]
    fn test_next_occurrence_across_midnight() {
        let now = utc(2026, 12, 31, 23, 59);
        let target = next_occurrence(&now, at(0, 30));
        assert_eq!(target, utc(2027, 1, 1, 0, 30));
        assert_eq!(sleep_duration(&now, &target), StdDuration::from_secs(31 * 60));
    }

    #[test]
    fn test_next_occurrence_uses_local_wall_clock() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // 23:00 local on March 1st is 21:00 UTC
        let now = tz.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap();
        let target = next_occurrence(&now, at(20, 0));
        assert_eq!(target, tz.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_next_occurrence_spring_forward_gap() {
        // 2026-03-08 02:30 does not exist in New York
        let now = New_York.with_ymd_and_hms(2026, 3, 8, 1, 0, 0).unwrap();
        let target = next_occurrence(&now, at(2, 30));
        assert_eq!(target, New_York.with_ymd_and_hms(2026, 3, 8, 3, 0, 0).unwrap());
        assert_eq!(sleep_duration(&now, &target), StdDuration::from_secs(3600));
    }

    #[test]
    fn test_next_occurrence_fall_back_takes_earliest() {
        // 2026-11-01 01:30 happens twice in New York
        let now = New_York.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();
        let target = next_occurrence(&now, at(1, 30));
        assert_eq!(sleep_duration(&now, &target), StdDuration::from_secs(90 * 60));
    }

    #[test]
    fn test_sleep_duration_never_negative() {
        let now = utc(2026, 3, 1, 20, 0);
        let past = utc(2026, 3, 1, 19, 0);
        assert_eq!(sleep_duration(&now, &past), StdDuration::ZERO);
        assert_eq!(sleep_duration(&now, &now), StdDuration::ZERO);
    }

    #[test]
    fn test_schedule_without_disable_always_enables() {
        let schedule = Schedule::new(at(20, 0), None);
        let next = schedule.next_event(&utc(2026, 3, 1, 6, 0));
        assert_eq!(next.event, ScheduledEvent::Enable);
        assert_eq!(next.at, utc(2026, 3, 1, 20, 0));
    }

    #[test]
    fn test_schedule_picks_nearest_event() {
        let schedule = Schedule::new(at(20, 0), Some(at(7, 0)));

        let morning = schedule.next_event(&utc(2026, 3, 1, 6, 0));
        assert_eq!(morning.event, ScheduledEvent::Disable);
        assert_eq!(morning.at, utc(2026, 3, 1, 7, 0));

        let noon = schedule.next_event(&utc(2026, 3, 1, 12, 0));
        assert_eq!(noon.event, ScheduledEvent::Enable);
        assert_eq!(noon.at, utc(2026, 3, 1, 20, 0));

        let late = schedule.next_event(&utc(2026, 3, 1, 22, 0));
        assert_eq!(late.event, ScheduledEvent::Disable);
        assert_eq!(late.at, utc(2026, 3, 2, 7, 0));
    }

    fn now_strategy() -> impl Strategy<Value = DateTime<Utc>> {
        // 2000-01-01 .. 2099-12-31
        (946_684_800i64..4_102_358_400i64)
            .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
    }

    proptest! {
        #[test]
        fn prop_next_occurrence_rolls_over(
            now in now_strategy(),
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let target_time = at(hour, minute);
            let target = next_occurrence(&now, target_time);

            prop_assert!(target > now);
            prop_assert!(target - now <= ChronoDuration::days(1));
            prop_assert_eq!(target.time(), target_time.time());

            let expected_date: NaiveDate = if now.time() < target_time.time() {
                now.date_naive()
            } else {
                now.date_naive() + ChronoDuration::days(1)
            };
            prop_assert_eq!(target.date_naive(), expected_date);
        }

        #[test]
        fn prop_sleep_duration_is_non_negative(
            a in now_strategy(),
            b in now_strategy(),
        ) {
            let d = sleep_duration(&a, &b);
            if b <= a {
                prop_assert_eq!(d, StdDuration::ZERO);
            } else {
                prop_assert_eq!(d.as_secs() as i64, (b - a).num_seconds());
            }
        }
    }
}
