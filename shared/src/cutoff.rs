//! Meal selection cutoff.
//!
//! Selections for the current date become read-only once the organization's
//! local clock reaches the cutoff time. Every check reads the clock it is
//! given; nothing is captured ahead of time.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// 12:30 PM local time
pub const DEFAULT_CUTOFF: (u32, u32) = (12, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffPolicy {
    pub timezone: Tz,
    pub cutoff: NaiveTime,
}

impl Default for CutoffPolicy {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Kolkata,
            cutoff: NaiveTime::from_hms_opt(DEFAULT_CUTOFF.0, DEFAULT_CUTOFF.1, 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }
}

impl CutoffPolicy {
    pub fn new(timezone: Tz, cutoff: NaiveTime) -> Self {
        Self { timezone, cutoff }
    }

    /// Calendar date in the organization's timezone at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    /// Whether selections for `date` are locked at `now`.
    ///
    /// Locked iff `date` is today (local) and the local time is at or past the
    /// cutoff. Other dates, past or future, are never locked by this rule.
    pub fn is_locked(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);
        date == local.date_naive() && local.time() >= self.cutoff
    }

    /// Whether `date` is before today (local) and can no longer be edited.
    pub fn is_past(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        date < self.today(now)
    }

    /// Cutoff formatted for messages, e.g. "12:30 PM"
    pub fn display_cutoff(&self) -> String {
        self.cutoff.format("%-I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn policy() -> CutoffPolicy {
        CutoffPolicy::default()
    }

    fn kolkata(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_unlocked_one_minute_before_cutoff() {
        let now = kolkata(2024, 6, 3, 12, 29);
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert!(!policy().is_locked(today, now));
    }

    #[test]
    fn test_locked_exactly_at_cutoff() {
        let now = kolkata(2024, 6, 3, 12, 30);
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert!(policy().is_locked(today, now));
    }

    #[test]
    fn test_other_date_never_locked_at_cutoff() {
        let now = kolkata(2024, 6, 3, 12, 30);
        let tomorrow = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        assert!(!policy().is_locked(tomorrow, now));
    }

    #[test]
    fn test_today_uses_local_date_not_utc() {
        // 00:15 in Kolkata on the 4th is still the 3rd in UTC
        let now = kolkata(2024, 6, 4, 0, 15);
        assert_eq!(now.date_naive(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(policy().today(now), NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    }

    #[test]
    fn test_is_past() {
        let now = kolkata(2024, 6, 3, 9, 0);
        assert!(policy().is_past(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), now));
        assert!(!policy().is_past(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), now));
    }

    #[test]
    fn test_display_cutoff() {
        assert_eq!(policy().display_cutoff(), "12:30 PM");
    }
}
