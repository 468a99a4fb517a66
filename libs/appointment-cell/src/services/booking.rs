use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::{DoctorRepository, PostgrestDoctorRepository};
use patient_cell::{PatientRepository, PostgrestPatientRepository};
use shared_config::AppConfig;
use shared_utils::clock::{Clock, SystemClock};

use crate::models::{
    Appointment, AppointmentChanges, AppointmentError, CreateAppointmentRequest, NewAppointment,
    UpdateAppointmentRequest,
};
use crate::services::cancellation::validate_cancellable;
use crate::services::conflict::ConflictChecker;
use crate::services::repository::{AppointmentRepository, PostgrestAppointmentRepository};
use crate::services::scheduling::validate_schedulable;

pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    doctors: Arc<dyn DoctorRepository>,
    patients: Arc<dyn PatientRepository>,
    conflicts: ConflictChecker,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dependencies(
            Arc::new(PostgrestAppointmentRepository::new(config)),
            Arc::new(PostgrestDoctorRepository::new(config)),
            Arc::new(PostgrestPatientRepository::new(config)),
            Arc::new(SystemClock),
        )
    }

    pub fn with_dependencies(
        appointments: Arc<dyn AppointmentRepository>,
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conflicts: ConflictChecker::new(appointments.clone()),
            appointments,
            doctors,
            patients,
            clock,
        }
    }

    /// Book a new appointment.
    ///
    /// Checks run in a fixed order: schedule rules, slot conflict, doctor
    /// existence, patient existence. Nothing is written unless all pass.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment for doctor {} at {} {}", request.doctor_id, request.date, request.hour);
        request.validate()?;

        validate_schedulable(&request.date, Some(&request.hour), self.clock.now())?;

        self.conflicts
            .ensure_available(request.doctor_id, &request.date, &request.hour, None)
            .await?;

        self.ensure_doctor_exists(request.doctor_id).await?;
        self.ensure_patient_exists(request.patient_id).await?;

        let appointment = self.appointments.create(NewAppointment {
            date: request.date,
            hour: request.hour,
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
        }).await?;

        info!("Appointment {} booked successfully", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);
        self.appointments.find_by_id(appointment_id).await?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    pub async fn list_doctor_appointments(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.find_by_doctor(doctor_id).await?;
        if appointments.is_empty() {
            return Err(AppointmentError::NoAppointmentsForDoctor(doctor_id));
        }
        Ok(appointments)
    }

    pub async fn list_patient_appointments(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.find_by_patient(patient_id).await?;
        if appointments.is_empty() {
            return Err(AppointmentError::NoAppointmentsForPatient(patient_id));
        }
        Ok(appointments)
    }

    /// Apply a partial update.
    ///
    /// A new date must come with a new hour. Schedule rules run against the
    /// stored values overlaid with the request, and the slot check always
    /// runs on that merged triple while ignoring this appointment itself.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment_id);

        let existing = self.get_appointment(appointment_id).await?;

        if request.date.is_some() && request.hour.is_none() {
            return Err(AppointmentError::MissingHourOnDateUpdate);
        }
        request.validate()?;

        let date = request.date.as_deref().or(existing.date.as_deref());
        let hour = request.hour.as_deref().or(existing.hour.as_deref());

        if request.changes_schedule() {
            let date = date.ok_or(AppointmentError::IncompleteAppointmentData)?;
            validate_schedulable(date, hour, self.clock.now())?;
        }

        if let Some(doctor_id) = request.doctor_id.filter(|id| *id != existing.doctor.id) {
            self.ensure_doctor_exists(doctor_id).await?;
        }
        if let Some(patient_id) = request.patient_id.filter(|id| *id != existing.patient.id) {
            self.ensure_patient_exists(patient_id).await?;
        }

        if let (Some(date), Some(hour)) = (date, hour) {
            let doctor_id = request.doctor_id.unwrap_or(existing.doctor.id);
            self.conflicts
                .ensure_available(doctor_id, date, hour, Some(appointment_id))
                .await?;
        }

        let updated = self.appointments
            .update(appointment_id, AppointmentChanges::from(request))
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        info!("Appointment {} updated", appointment_id);
        Ok(updated)
    }

    /// Cancel (delete) an appointment while more than two hours remain.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Cancelling appointment {}", appointment_id);

        let existing = self.get_appointment(appointment_id).await?;

        if let Err(e) = validate_cancellable(
            existing.date.as_deref(),
            existing.hour.as_deref(),
            self.clock.now(),
        ) {
            warn!("Refusing to cancel appointment {}: {}", appointment_id, e);
            return Err(e);
        }

        if !self.appointments.remove(appointment_id).await? {
            return Err(AppointmentError::NotFound(appointment_id));
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    async fn ensure_doctor_exists(&self, doctor_id: Uuid) -> Result<(), AppointmentError> {
        let doctor = self.doctors.find_by_id(doctor_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match doctor {
            Some(_) => Ok(()),
            None => Err(AppointmentError::DoctorNotFound(doctor_id)),
        }
    }

    async fn ensure_patient_exists(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        let patient = self.patients.find_by_id(patient_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        match patient {
            Some(_) => Ok(()),
            None => Err(AppointmentError::PatientNotFound(patient_id)),
        }
    }
}
