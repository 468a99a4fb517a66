use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::AppointmentError;
use crate::services::repository::AppointmentRepository;

/// Detects double-booking of a doctor at an exact date and hour.
///
/// This is a read-before-write check; concurrent writers can still race
/// past it, in which case the store's unique index reports the conflict.
pub struct ConflictChecker {
    repository: Arc<dyn AppointmentRepository>,
}

impl ConflictChecker {
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self { repository }
    }

    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        date: &str,
        hour: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        debug!("Checking conflicts for doctor {} at {} {}", doctor_id, date, hour);

        // The excluded id is filtered out by the store query.
        let taken = self.repository
            .find_in_slot(doctor_id, date.to_string(), hour.to_string(), exclude)
            .await?;

        Ok(!taken.is_empty())
    }

    /// Fails with `AppointmentConflict` when the slot is taken.
    pub async fn ensure_available(
        &self,
        doctor_id: Uuid,
        date: &str,
        hour: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        if self.has_conflict(doctor_id, date, hour, exclude).await? {
            warn!("Conflict detected for doctor {} at {} {}", doctor_id, date, hour);
            return Err(AppointmentError::AppointmentConflict);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mockall::predicate::{always, eq};
    use tokio_test::assert_ok;

    use crate::services::repository::MockAppointmentRepository;

    #[tokio::test]
    async fn test_free_slot() {
        let mut repository = MockAppointmentRepository::new();
        repository.expect_find_in_slot().returning(|_, _, _, _| Ok(vec![]));

        let checker = ConflictChecker::new(Arc::new(repository));

        assert!(!checker.has_conflict(Uuid::new_v4(), "25/12/2024", "14:30", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_taken_slot() {
        let doctor_id = Uuid::new_v4();
        let mut repository = MockAppointmentRepository::new();
        repository.expect_find_in_slot()
            .with(eq(doctor_id), eq("25/12/2024".to_string()), eq("14:30".to_string()), eq(None))
            .returning(|_, _, _, _| Ok(vec![Uuid::new_v4()]));

        let checker = ConflictChecker::new(Arc::new(repository));

        assert_matches!(
            checker.ensure_available(doctor_id, "25/12/2024", "14:30", None).await,
            Err(AppointmentError::AppointmentConflict)
        );
    }

    #[tokio::test]
    async fn test_own_appointment_is_not_a_conflict() {
        let own_id = Uuid::new_v4();
        let mut repository = MockAppointmentRepository::new();
        repository.expect_find_in_slot()
            .with(always(), always(), always(), eq(Some(own_id)))
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let checker = ConflictChecker::new(Arc::new(repository));

        assert_ok!(checker.ensure_available(Uuid::new_v4(), "25/12/2024", "14:30", Some(own_id)).await);
    }

    #[tokio::test]
    async fn test_other_appointment_conflicts_while_excluding_own() {
        let own_id = Uuid::new_v4();
        let mut repository = MockAppointmentRepository::new();
        repository.expect_find_in_slot()
            .with(always(), always(), always(), eq(Some(own_id)))
            .returning(|_, _, _, _| Ok(vec![Uuid::new_v4()]));

        let checker = ConflictChecker::new(Arc::new(repository));

        assert_matches!(
            checker.ensure_available(Uuid::new_v4(), "25/12/2024", "14:30", Some(own_id)).await,
            Err(AppointmentError::AppointmentConflict)
        );
    }
}
