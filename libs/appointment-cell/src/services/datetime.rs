use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::models::AppointmentError;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("date pattern is valid")
});

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2})$").expect("time pattern is valid")
});

/// Parses `DD/MM/YYYY` into a calendar date.
///
/// Shape errors and impossible dates (`31/02/2024`, `00/01/2024`) are
/// reported separately.
pub fn parse_date(text: &str) -> Result<NaiveDate, AppointmentError> {
    let captures = DATE_PATTERN.captures(text).ok_or(AppointmentError::InvalidDateFormat)?;

    let day: u32 = captures[1].parse().map_err(|_| AppointmentError::InvalidDateFormat)?;
    let month: u32 = captures[2].parse().map_err(|_| AppointmentError::InvalidDateFormat)?;
    let year: i32 = captures[3].parse().map_err(|_| AppointmentError::InvalidDateFormat)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(AppointmentError::InvalidDate)
}

/// Parses a 24h `HH:MM` clock value. Hours above 23 or minutes above 59
/// are rejected as a format error.
pub fn parse_time(text: &str) -> Result<NaiveTime, AppointmentError> {
    let captures = TIME_PATTERN.captures(text).ok_or(AppointmentError::InvalidTimeFormat)?;

    let hour: u32 = captures[1].parse().map_err(|_| AppointmentError::InvalidTimeFormat)?;
    let minute: u32 = captures[2].parse().map_err(|_| AppointmentError::InvalidTimeFormat)?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(AppointmentError::InvalidTimeFormat)
}

/// Combines a date and optional hour into a local moment; midnight when no
/// hour is given.
pub fn parse_moment(date: &str, hour: Option<&str>) -> Result<NaiveDateTime, AppointmentError> {
    let date = parse_date(date)?;
    let time = match hour {
        Some(hour) => parse_time(hour)?,
        None => NaiveTime::MIN,
    };
    Ok(date.and_time(time))
}
