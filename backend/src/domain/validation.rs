use chrono::{DateTime, NaiveDate, Utc};

use super::errors::{StoreError, StoreResult};
use shared::parse_clock_time;

pub fn require_non_blank(value: &str, field: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Birth dates are plain YYYY-MM-DD dates, not in the future
pub fn validate_birth_date(birth_date: &str) -> StoreResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d")
        .map_err(|_| StoreError::validation("Birth date must be in YYYY-MM-DD format"))?;

    if date > Utc::now().date_naive() {
        return Err(StoreError::validation("Birth date cannot be in the future"));
    }
    Ok(date)
}

/// Occurrence dates accept either a calendar date or a full RFC 3339 timestamp
pub fn validate_occurrence_date(date: &str) -> StoreResult<()> {
    let date = date.trim();
    let is_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    let is_timestamp = DateTime::parse_from_rfc3339(date).is_ok();
    if is_date || is_timestamp {
        Ok(())
    } else {
        Err(StoreError::validation(format!("Invalid class date: {}", date)))
    }
}

/// Start and end must be HH:mm with start strictly before end
pub fn validate_time_range(start_time: &str, end_time: &str) -> StoreResult<()> {
    let start = parse_clock_time(start_time)
        .map_err(|e| StoreError::validation(format!("Start time: {}", e)))?;
    let end = parse_clock_time(end_time)
        .map_err(|e| StoreError::validation(format!("End time: {}", e)))?;

    if start >= end {
        return Err(StoreError::validation(format!(
            "Start time {} must be before end time {}",
            start_time, end_time
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_birth_date() {
        assert!(validate_birth_date("2015-06-15").is_ok());
        assert!(validate_birth_date("2000-02-29").is_ok()); // Leap year

        assert!(validate_birth_date("2015/06/15").is_err());
        assert!(validate_birth_date("2015-02-30").is_err());
        assert!(validate_birth_date("2015-13-01").is_err());
        assert!(validate_birth_date("9999-01-01").is_err()); // Future
    }

    #[test]
    fn test_validate_occurrence_date() {
        assert!(validate_occurrence_date("2025-03-10").is_ok());
        assert!(validate_occurrence_date("2025-03-10T18:00:00Z").is_ok());
        assert!(validate_occurrence_date("next monday").is_err());
        assert!(validate_occurrence_date("").is_err());
    }

    #[test]
    fn test_validate_time_range() {
        assert!(validate_time_range("18:00", "19:30").is_ok());

        assert!(validate_time_range("19:30", "18:00").is_err());
        assert!(validate_time_range("18:00", "18:00").is_err());
        assert!(validate_time_range("6pm", "19:30").is_err());
        assert!(validate_time_range("18:00", "25:00").is_err());
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("Ala", "First name").is_ok());
        let err = require_non_blank("   ", "First name").unwrap_err();
        assert_eq!(err.to_string(), "First name cannot be empty");
    }
}
