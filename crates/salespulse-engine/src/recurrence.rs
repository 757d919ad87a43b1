//! Recurrence calculator — pure schedule math, no I/O.
//!
//! Maps a timer's recurrence configuration and pre-increment trigger count
//! to its next state. Monthly steps use calendar month arithmetic (Jan 31 +
//! 1 month clamps to end of February), never a fixed 30-day approximation.

use chrono::{DateTime, Duration, Months, NaiveDate, TimeZone, Utc};

use salespulse_core::types::{Timer, TimerStatus};

/// The state transition a processing run applies to a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceOutcome {
    pub status: TimerStatus,
    pub next_trigger: Option<DateTime<Utc>>,
}

impl RecurrenceOutcome {
    fn completed() -> Self {
        Self {
            status: TimerStatus::Completed,
            next_trigger: None,
        }
    }
}

/// Compute the timer's next (status, next_trigger) for a run happening at
/// `now`. `timer.trigger_count` is the count BEFORE this run's increment.
pub fn advance(timer: &Timer, now: DateTime<Utc>) -> RecurrenceOutcome {
    if !timer.recurrence_enabled {
        return RecurrenceOutcome::completed();
    }

    let candidate = next_candidate(
        timer.recurrence_pattern.as_deref(),
        timer.recurrence_interval,
        now,
    );

    match timer.recurrence_end_condition.as_deref() {
        Some("after_n_times") => {
            // Missing or unparseable count reads as 0 and retires the timer.
            let n = timer
                .recurrence_end_value
                .as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0);
            if timer.trigger_count + 1 >= n {
                return RecurrenceOutcome::completed();
            }
        }
        Some("until_date") => {
            if let (Some(next), Some(end)) = (
                candidate,
                parse_end_date(timer.recurrence_end_value.as_deref()),
            ) && next > end
            {
                return RecurrenceOutcome::completed();
            }
        }
        _ => {}
    }

    match candidate {
        Some(next) => RecurrenceOutcome {
            status: TimerStatus::Active,
            next_trigger: Some(next),
        },
        // No valid next trigger — nothing left to schedule.
        None => RecurrenceOutcome::completed(),
    }
}

/// Raw next-trigger candidate: now + interval units of the pattern.
/// The interval is passed through to date arithmetic unvalidated.
fn next_candidate(pattern: Option<&str>, interval: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match pattern {
        Some("daily") => now.checked_add_signed(Duration::days(interval)),
        Some("weekly") => now.checked_add_signed(Duration::days(7 * interval)),
        Some("monthly") => add_months(now, interval),
        other => {
            tracing::warn!("Unrecognized recurrence pattern: {:?}", other);
            None
        }
    }
}

fn add_months(now: DateTime<Utc>, interval: i64) -> Option<DateTime<Utc>> {
    let months = Months::new(u32::try_from(interval.unsigned_abs()).ok()?);
    if interval >= 0 {
        now.checked_add_months(months)
    } else {
        now.checked_sub_months(months)
    }
}

/// Parse an until_date value: RFC 3339 timestamp, or a bare date at
/// midnight UTC. Unparseable dates never force termination.
fn parse_end_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    tracing::warn!("Unparseable recurrence end date: '{raw}'");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(enabled: bool, pattern: Option<&str>, interval: i64) -> Timer {
        Timer {
            id: "t1".into(),
            entity_type: "lead".into(),
            entity_id: "l1".into(),
            timer_type: "follow_up".into(),
            priority: "high".into(),
            action_required: "Call the client".into(),
            description: None,
            assigned_to: "u1".into(),
            notify_also: vec![],
            channels: vec![],
            status: TimerStatus::Active,
            recurrence_enabled: enabled,
            recurrence_pattern: pattern.map(String::from),
            recurrence_interval: interval,
            recurrence_end_condition: None,
            recurrence_end_value: None,
            trigger_count: 0,
            next_trigger: None,
            last_triggered: None,
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_non_recurring_completes() {
        let out = advance(&timer(false, Some("daily"), 1), at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Completed);
        assert_eq!(out.next_trigger, None);
    }

    #[test]
    fn test_daily_adds_interval_days() {
        let now = at(2026, 8, 5, 12);
        let out = advance(&timer(true, Some("daily"), 3), now);
        assert_eq!(out.status, TimerStatus::Active);
        assert_eq!(out.next_trigger, Some(at(2026, 8, 8, 12)));
    }

    #[test]
    fn test_weekly_adds_seven_n_days() {
        let now = at(2026, 8, 5, 12);
        let out = advance(&timer(true, Some("weekly"), 2), now);
        assert_eq!(out.next_trigger, Some(at(2026, 8, 19, 12)));
    }

    #[test]
    fn test_monthly_is_calendar_aware() {
        let now = at(2026, 1, 31, 9);
        let out = advance(&timer(true, Some("monthly"), 1), now);
        // Jan 31 + 1 month clamps to Feb 28 (2026 is not a leap year)
        assert_eq!(out.next_trigger, Some(at(2026, 2, 28, 9)));
        assert_eq!(out.status, TimerStatus::Active);
    }

    #[test]
    fn test_unrecognized_pattern_completes() {
        let out = advance(&timer(true, Some("fortnightly"), 1), at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Completed);
        assert_eq!(out.next_trigger, None);
    }

    #[test]
    fn test_after_n_times_terminates_on_last_run() {
        let mut t = timer(true, Some("daily"), 1);
        t.recurrence_end_condition = Some("after_n_times".into());
        t.recurrence_end_value = Some("3".into());
        t.trigger_count = 2; // this run is the third
        let out = advance(&t, at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Completed);
        assert_eq!(out.next_trigger, None);
    }

    #[test]
    fn test_after_n_times_continues_before_limit() {
        let mut t = timer(true, Some("daily"), 1);
        t.recurrence_end_condition = Some("after_n_times".into());
        t.recurrence_end_value = Some("3".into());
        t.trigger_count = 1;
        let out = advance(&t, at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Active);
    }

    #[test]
    fn test_after_n_times_invalid_count_retires() {
        let mut t = timer(true, Some("daily"), 1);
        t.recurrence_end_condition = Some("after_n_times".into());
        t.recurrence_end_value = Some("soon".into());
        let out = advance(&t, at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Completed);
    }

    #[test]
    fn test_until_date_terminates_past_deadline() {
        let mut t = timer(true, Some("weekly"), 1);
        t.recurrence_end_condition = Some("until_date".into());
        t.recurrence_end_value = Some("2026-08-10".into());
        let out = advance(&t, at(2026, 8, 5, 12)); // candidate Aug 12 > Aug 10
        assert_eq!(out.status, TimerStatus::Completed);
        assert_eq!(out.next_trigger, None);
    }

    #[test]
    fn test_until_date_continues_before_deadline() {
        let mut t = timer(true, Some("daily"), 1);
        t.recurrence_end_condition = Some("until_date".into());
        t.recurrence_end_value = Some("2026-12-31T00:00:00+00:00".into());
        let out = advance(&t, at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Active);
        assert_eq!(out.next_trigger, Some(at(2026, 8, 6, 12)));
    }

    #[test]
    fn test_until_date_unparseable_stays_active() {
        let mut t = timer(true, Some("daily"), 1);
        t.recurrence_end_condition = Some("until_date".into());
        t.recurrence_end_value = Some("next quarter".into());
        let out = advance(&t, at(2026, 8, 5, 12));
        assert_eq!(out.status, TimerStatus::Active);
    }

    #[test]
    fn test_zero_interval_passes_through() {
        let now = at(2026, 8, 5, 12);
        let out = advance(&timer(true, Some("daily"), 0), now);
        // Unvalidated by design: the timer reschedules to the same instant.
        assert_eq!(out.next_trigger, Some(now));
    }
}
