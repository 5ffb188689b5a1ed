//! # Activity Filter
//! Decides whether an alert's onset/expiry window makes it relevant at the
//! evaluation instant. `now` is captured once per run so every record sees
//! the same snapshot.
//!
//! Two mutually exclusive policies exist in the wild: "currently active"
//! and "starting within the next N days". Both are first-class here; the
//! look-ahead only moves the upper bound an onset may reach, expiry is
//! always checked against `now`. All bounds are inclusive.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityPolicy {
    /// Keep alerts whose window contains `now`.
    #[default]
    ActiveNow,
    /// Additionally keep alerts whose onset lies within the next `days` days.
    UpcomingWindow { days: i64 },
}

impl ActivityPolicy {
    /// Apply the decision table:
    ///
    /// | onset   | expires | keep iff                  |
    /// |---------|---------|---------------------------|
    /// | present | present | onset <= horizon, now <= expires |
    /// | present | absent  | onset <= horizon          |
    /// | absent  | present | now <= expires            |
    /// | absent  | absent  | always (open-ended)       |
    ///
    /// where `horizon` is `now` for `ActiveNow` and `now + days` for
    /// `UpcomingWindow`.
    pub fn is_relevant(
        self,
        now: DateTime<Utc>,
        onset: Option<DateTime<FixedOffset>>,
        expires: Option<DateTime<FixedOffset>>,
    ) -> bool {
        let horizon = match self {
            ActivityPolicy::ActiveNow => now,
            ActivityPolicy::UpcomingWindow { days } => now + Duration::days(days),
        };
        let onset_ok = onset.map_or(true, |o| o.with_timezone(&Utc) <= horizon);
        let expires_ok = expires.map_or(true, |e| now <= e.with_timezone(&Utc));
        onset_ok && expires_ok
    }
}

impl FromStr for ActivityPolicy {
    type Err = String;

    /// Accepts `active-now` or `upcoming-window:<days>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("active-now") {
            return Ok(ActivityPolicy::ActiveNow);
        }
        if let Some(days) = s.strip_prefix("upcoming-window:") {
            let days: i64 = days
                .trim()
                .parse()
                .map_err(|_| format!("invalid look-ahead days in {s:?}"))?;
            if days < 0 {
                return Err(format!("look-ahead days must be >= 0, got {days}"));
            }
            return Ok(ActivityPolicy::UpcomingWindow { days });
        }
        Err(format!(
            "unknown activity policy {s:?}, expected active-now or upcoming-window:<days>"
        ))
    }
}

impl fmt::Display for ActivityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityPolicy::ActiveNow => f.write_str("active-now"),
            ActivityPolicy::UpcomingWindow { days } => write!(f, "upcoming-window:{days}"),
        }
    }
}
