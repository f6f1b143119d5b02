//! Input validation functions
//!
//! Plain range checks for log and query input. Request structs additionally
//! derive `validator::Validate` for field-level limits.

use crate::models::LogCategory;
use chrono::{DateTime, Duration, Utc};

/// Clock skew tolerated for client-supplied timestamps
const MAX_FUTURE_SKEW_MINUTES: i64 = 5;
/// Oldest backfilled log accepted
const MAX_BACKFILL_DAYS: i64 = 365;

pub const MAX_QUERY_DAYS: u32 = 90;
pub const MAX_LOGS_LIMIT: u32 = 200;
pub const MAX_NUDGES_LIMIT: u32 = 100;

/// Validate a log timestamp relative to `now`
pub fn validate_log_timestamp(logged_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), String> {
    if logged_at > now + Duration::minutes(MAX_FUTURE_SKEW_MINUTES) {
        return Err("Log time cannot be in the future".to_string());
    }
    if logged_at < now - Duration::days(MAX_BACKFILL_DAYS) {
        return Err("Log time cannot be more than a year ago".to_string());
    }
    Ok(())
}

/// Validate an optional reading for its category
pub fn validate_log_value(category: LogCategory, value: Option<f64>) -> Result<(), String> {
    let Some(value) = value else {
        return Ok(());
    };

    if value.is_nan() || value.is_infinite() {
        return Err("Value must be a valid number".to_string());
    }

    let (min, max, unit) = match category {
        LogCategory::Glucose => (10.0, 1000.0, "mg/dL"),
        LogCategory::Weight => (20.0, 500.0, "kg"),
        LogCategory::Bp => (40.0, 300.0, "mmHg"),
        LogCategory::Activity => (0.0, 1440.0, "minutes"),
        LogCategory::Meal | LogCategory::Medication => (0.0, 100000.0, ""),
    };

    if value < min || value > max {
        let unit = if unit.is_empty() {
            String::new()
        } else {
            format!(" {}", unit)
        };
        return Err(format!(
            "{} value must be between {}{} and {}{}",
            category, min, unit, max, unit
        ));
    }
    Ok(())
}

/// Validate a look-back horizon in days
pub fn validate_days(days: u32) -> Result<(), String> {
    if days == 0 {
        return Err("Days must be at least 1".to_string());
    }
    if days > MAX_QUERY_DAYS {
        return Err(format!("Days cannot exceed {}", MAX_QUERY_DAYS));
    }
    Ok(())
}

/// Validate a page size
pub fn validate_limit(limit: u32, max: u32) -> Result<(), String> {
    if limit == 0 {
        return Err("Limit must be at least 1".to_string());
    }
    if limit > max {
        return Err(format!("Limit cannot exceed {}", max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validate_log_timestamp() {
        assert!(validate_log_timestamp(now(), now()).is_ok());
        assert!(validate_log_timestamp(now() + Duration::minutes(4), now()).is_ok());
        assert!(validate_log_timestamp(now() + Duration::hours(1), now()).is_err());
        assert!(validate_log_timestamp(now() - Duration::days(400), now()).is_err());
    }

    #[test]
    fn test_validate_log_value() {
        assert!(validate_log_value(LogCategory::Glucose, None).is_ok());
        assert!(validate_log_value(LogCategory::Glucose, Some(120.0)).is_ok());
        assert!(validate_log_value(LogCategory::Glucose, Some(5.0)).is_err());
        assert!(validate_log_value(LogCategory::Activity, Some(1500.0)).is_err());
        assert!(validate_log_value(LogCategory::Weight, Some(f64::NAN)).is_err());

        let err = validate_log_value(LogCategory::Bp, Some(20.0)).unwrap_err();
        assert_eq!(err, "bp value must be between 40 mmHg and 300 mmHg");
    }

    #[test]
    fn test_validate_days() {
        assert!(validate_days(0).is_err());
        assert!(validate_days(14).is_ok());
        assert!(validate_days(91).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(0, MAX_NUDGES_LIMIT).is_err());
        assert!(validate_limit(10, MAX_NUDGES_LIMIT).is_ok());
        assert!(validate_limit(101, MAX_NUDGES_LIMIT).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_glucose_range(value in 10.0f64..=1000.0) {
            prop_assert!(validate_log_value(LogCategory::Glucose, Some(value)).is_ok());
        }

        #[test]
        fn prop_negative_values_rejected(value in -1000.0f64..-0.01, c in 0usize..6) {
            prop_assert!(validate_log_value(LogCategory::ALL[c], Some(value)).is_err());
        }

        #[test]
        fn prop_recent_timestamps_accepted(minutes in 0i64..(60 * 24 * 364)) {
            prop_assert!(validate_log_timestamp(now() - Duration::minutes(minutes), now()).is_ok());
        }
    }
}
