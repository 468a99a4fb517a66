use chrono::{Duration, NaiveDateTime};

use crate::models::AppointmentError;
use crate::services::datetime::parse_moment;

pub const CANCELLATION_CUTOFF_MINUTES: i64 = 120;

/// Allows cancellation only while strictly more than the cutoff remains
/// before the stored moment. Past appointments fall on the negative side.
pub fn validate_cancellable(
    date: Option<&str>,
    hour: Option<&str>,
    now: NaiveDateTime,
) -> Result<(), AppointmentError> {
    let (Some(date), Some(hour)) = (date, hour) else {
        return Err(AppointmentError::IncompleteAppointmentData);
    };

    let scheduled = parse_moment(date, Some(hour))?;

    if scheduled - now <= Duration::minutes(CANCELLATION_CUTOFF_MINUTES) {
        return Err(AppointmentError::WithinCancellationWindow);
    }

    Ok(())
}
