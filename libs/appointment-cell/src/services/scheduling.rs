use chrono::{Datelike, NaiveDateTime};

use crate::models::AppointmentError;
use crate::services::datetime::parse_moment;

/// Checks that `date` (and `hour`, when given) is a bookable moment.
///
/// Without an hour only the day is compared, so any time today is fine.
/// Bookings are accepted for the current and the following calendar year.
pub fn validate_schedulable(
    date: &str,
    hour: Option<&str>,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, AppointmentError> {
    let moment = parse_moment(date, hour)?;

    let in_past = match hour {
        Some(_) => moment < now,
        None => moment.date() < now.date(),
    };
    if in_past {
        return Err(AppointmentError::AppointmentInPast);
    }

    let current_year = now.year();
    if moment.year() < current_year || moment.year() > current_year + 1 {
        return Err(AppointmentError::YearOutOfRange { current_year });
    }

    Ok(moment)
}
