use chrono::NaiveDate;

use crate::error::AppError;

pub const MAX_HOURS_PER_ENTRY: f64 = 24.0;

// absorbs float noise from summing fractional hours
const EPSILON: f64 = 1e-9;

/// Hours of a single entry must lie in `(0, 24]`.
pub fn validate_hours(hours: f64) -> Result<(), AppError> {
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_HOURS_PER_ENTRY {
        return Err(AppError::bad_request(format!(
            "Hours must be greater than 0 and at most {MAX_HOURS_PER_ENTRY}"
        )));
    }
    Ok(())
}

/// `already_logged` is the user's total for `date` without the entry being written.
pub fn check_daily_cap(
    date: NaiveDate,
    already_logged: f64,
    hours: f64,
    cap: Option<f64>,
) -> Result<(), AppError> {
    let Some(cap) = cap else {
        return Ok(());
    };

    if already_logged + hours > cap + EPSILON {
        return Err(AppError::bad_request(format!(
            "Daily limit of {cap} hours exceeded: {already_logged} hours already logged on {date}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn hours_bounds() {
        assert!(validate_hours(0.5).is_ok());
        assert!(validate_hours(24.0).is_ok());

        assert!(validate_hours(0.0).is_err());
        assert!(validate_hours(-1.0).is_err());
        assert!(validate_hours(24.5).is_err());
        assert!(validate_hours(f64::NAN).is_err());
        assert!(validate_hours(f64::INFINITY).is_err());
    }

    #[test]
    fn no_cap_accepts_anything_valid() {
        assert!(check_daily_cap(day(), 20.0, 4.0, None).is_ok());
    }

    #[test]
    fn cap_is_inclusive() {
        assert!(check_daily_cap(day(), 6.0, 2.0, Some(8.0)).is_ok());
        assert!(check_daily_cap(day(), 7.5, 0.5, Some(8.0)).is_ok());
        assert!(check_daily_cap(day(), 0.0, 8.0, Some(8.0)).is_ok());
    }

    #[test]
    fn cap_rejects_overflow() {
        let err = check_daily_cap(day(), 6.5, 2.0, Some(8.0)).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("Daily limit of 8 hours"));
        assert!(message.contains("2026-03-02"));
    }

    #[test]
    fn fractional_sums_do_not_trip_the_cap() {
        let logged = 0.1 + 0.2 + 0.3 + 7.0;
        assert!(check_daily_cap(day(), logged, 0.4, Some(8.0)).is_ok());
    }
}
