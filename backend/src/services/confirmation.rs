use canteen_shared::CutoffPolicy;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ApiError, ApiResult};

/// Reject edits for past dates and for today once the cutoff has passed.
///
/// `now` comes from the caller so every check reads the clock afresh.
pub fn ensure_editable(policy: &CutoffPolicy, date: NaiveDate, now: DateTime<Utc>) -> ApiResult<()> {
    if policy.is_past(date, now) {
        return Err(ApiError::conflict(format!(
            "Selections for {} can no longer be changed",
            date
        )));
    }
    if policy.is_locked(date, now) {
        return Err(ApiError::conflict(format!(
            "Selections for {} are locked after {}",
            date,
            policy.cutoff.format("%H:%M")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    /// `h:m` IST on 2024-06-03
    fn ist(h: u32, m: u32) -> DateTime<Utc> {
        chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(2024, 6, 3, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_editable_before_cutoff() {
        assert!(ensure_editable(&CutoffPolicy::default(), date(), ist(12, 29)).is_ok());
    }

    #[test]
    fn test_locked_at_cutoff() {
        let err = ensure_editable(&CutoffPolicy::default(), date(), ist(12, 30)).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Selections for 2024-06-03 are locked after 12:30");
    }

    #[test]
    fn test_future_date_editable_after_cutoff() {
        let tomorrow = date().succ_opt().unwrap();
        assert!(ensure_editable(&CutoffPolicy::default(), tomorrow, ist(18, 0)).is_ok());
    }

    #[test]
    fn test_past_date_rejected() {
        let yesterday = date().pred_opt().unwrap();
        let err = ensure_editable(&CutoffPolicy::default(), yesterday, ist(9, 0)).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
