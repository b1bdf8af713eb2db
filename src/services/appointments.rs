//! Appointment management: confirm, cancel, reschedule.
//!
//! Bookings are created by the customer-facing product through the shared
//! store; the panel only transitions them. Every transition drops a
//! notification into the barber's inbox so the notification feed reflects
//! what happened to their agenda.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::db::{
    AppointmentFilter, AppointmentRepository, FullRepository, NotificationRepository,
};
use crate::models::{
    Appointment, AppointmentStatus, BarberId, Notification, SlotTime, Weekday,
};

pub struct AppointmentDesk {
    repo: Arc<dyn FullRepository>,
}

impl AppointmentDesk {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &AppointmentFilter) -> ServiceResult<Vec<Appointment>> {
        Ok(self.repo.list_appointments(filter).await?)
    }

    /// Confirm a pending appointment. Only `Pending` can be confirmed.
    pub async fn confirm(&self, id: Uuid) -> ServiceResult<Appointment> {
        let mut appointment = self.repo.get_appointment(id).await?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(ServiceError::validation(format!(
                "only pending appointments can be confirmed (current status: {:?})",
                appointment.status
            )));
        }
        appointment.status = AppointmentStatus::Confirmed;
        self.repo.update_appointment(&appointment).await?;
        self.notify(
            appointment.barber_id,
            "Cita confirmada",
            format!(
                "La cita de {} el {} a las {} fue confirmada",
                appointment.client_name, appointment.date, appointment.time
            ),
        )
        .await?;
        Ok(appointment)
    }

    /// Cancel an appointment. Cancelling twice is rejected.
    pub async fn cancel(&self, id: Uuid) -> ServiceResult<Appointment> {
        let mut appointment = self.repo.get_appointment(id).await?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(ServiceError::validation("appointment is already cancelled"));
        }
        appointment.status = AppointmentStatus::Cancelled;
        self.repo.update_appointment(&appointment).await?;
        self.notify(
            appointment.barber_id,
            "Cita cancelada",
            format!(
                "La cita de {} el {} a las {} fue cancelada",
                appointment.client_name, appointment.date, appointment.time
            ),
        )
        .await?;
        Ok(appointment)
    }

    /// Move an appointment to a new date/time and optionally a different
    /// service. Cancelled appointments cannot be rescheduled; Sundays are
    /// not bookable.
    pub async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        time: SlotTime,
        service: Option<&str>,
    ) -> ServiceResult<Appointment> {
        let mut appointment = self.repo.get_appointment(id).await?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(ServiceError::validation(
                "cancelled appointments cannot be rescheduled",
            ));
        }
        if Weekday::from_date(date).is_none() {
            return Err(ServiceError::validation(format!(
                "{} falls on a Sunday, which is not bookable",
                date
            )));
        }

        appointment.date = date;
        appointment.time = time;
        if let Some(service) = service {
            let service = service.trim();
            if service.is_empty() {
                return Err(ServiceError::validation("service name cannot be empty"));
            }
            appointment.service = service.to_string();
        }
        self.repo.update_appointment(&appointment).await?;
        self.notify(
            appointment.barber_id,
            "Cita reprogramada",
            format!(
                "La cita de {} se movió al {} a las {}",
                appointment.client_name, appointment.date, appointment.time
            ),
        )
        .await?;
        Ok(appointment)
    }

    async fn notify(
        &self,
        barber_id: BarberId,
        title: &str,
        body: String,
    ) -> ServiceResult<()> {
        let notification = Notification {
            id: Uuid::new_v4(),
            barber_id,
            title: title.to_string(),
            body,
            read: false,
            created_at: Utc::now(),
        };
        self.repo.insert_notification(&notification).await?;
        Ok(())
    }
}
