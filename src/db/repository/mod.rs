//! Repository trait definitions.
//!
//! One trait per aggregate, combined into [`FullRepository`] for consumers
//! that need the whole store. Implementations must be `Send + Sync` to work
//! with async Rust.

pub mod error;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use super::models::{AppointmentFilter, AvailabilityRow, DateOverrideRow};
use crate::models::{Appointment, Barber, BarberId, Notification, ServiceItem, TimeOffEntry};

/// Repository trait for barber profiles.
#[async_trait]
pub trait BarberRepository: Send + Sync {
    async fn list_barbers(&self) -> RepositoryResult<Vec<Barber>>;

    /// Fetch one barber; `NotFound` if the id is unknown.
    async fn get_barber(&self, id: BarberId) -> RepositoryResult<Barber>;

    async fn insert_barber(&self, barber: &Barber) -> RepositoryResult<()>;

    /// Delete a barber and cascade their availability rows, date overrides,
    /// time-off entries, and notifications in the same storage transaction.
    /// Appointment history is kept.
    async fn delete_barber(&self, id: BarberId) -> RepositoryResult<()>;

    async fn count_barbers(&self) -> RepositoryResult<usize>;
}

/// Repository trait for weekly availability and calendar-date overrides.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn fetch_weekly_rows(&self, barber_id: BarberId)
        -> RepositoryResult<Vec<AvailabilityRow>>;

    async fn fetch_date_overrides(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<DateOverrideRow>>;

    /// Replace-all persistence for one barber: every existing weekly row and
    /// date override is deleted and the new set written, atomically. The
    /// store never exposes a state mixing old and new rows.
    async fn replace_availability(
        &self,
        barber_id: BarberId,
        weekly: Vec<AvailabilityRow>,
        overrides: Vec<DateOverrideRow>,
    ) -> RepositoryResult<()>;
}

/// Repository trait for the time-off register.
#[async_trait]
pub trait TimeOffRepository: Send + Sync {
    /// Entries for one barber, ascending by date.
    async fn list_time_off(&self, barber_id: BarberId) -> RepositoryResult<Vec<TimeOffEntry>>;

    async fn insert_time_off(&self, entry: &TimeOffEntry) -> RepositoryResult<()>;

    /// Delete one entry; `NotFound` if the id is unknown.
    async fn delete_time_off(&self, entry_id: Uuid) -> RepositoryResult<()>;

    async fn time_off_exists(&self, barber_id: BarberId, date: NaiveDate)
        -> RepositoryResult<bool>;
}

/// Repository trait for the service catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_services(&self) -> RepositoryResult<Vec<ServiceItem>>;

    async fn insert_service(&self, service: &ServiceItem) -> RepositoryResult<()>;

    /// Update an existing service; `NotFound` if the id is unknown.
    async fn update_service(&self, service: &ServiceItem) -> RepositoryResult<()>;

    async fn delete_service(&self, id: Uuid) -> RepositoryResult<()>;
}

/// Repository trait for appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointments matching the filter, ordered by date then time.
    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> RepositoryResult<Vec<Appointment>>;

    async fn get_appointment(&self, id: Uuid) -> RepositoryResult<Appointment>;

    async fn insert_appointment(&self, appointment: &Appointment) -> RepositoryResult<()>;

    async fn update_appointment(&self, appointment: &Appointment) -> RepositoryResult<()>;
}

/// Repository trait for notifications, including the change feed.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Notifications for one barber, newest first.
    async fn list_notifications(&self, barber_id: BarberId)
        -> RepositoryResult<Vec<Notification>>;

    /// Insert a notification and publish it on the change feed.
    async fn insert_notification(&self, notification: &Notification) -> RepositoryResult<()>;

    /// Mark one notification read; idempotent on already-read entries.
    async fn mark_notification_read(&self, id: Uuid) -> RepositoryResult<()>;

    /// Mark every notification for a barber read, returning how many changed.
    async fn mark_all_read(&self, barber_id: BarberId) -> RepositoryResult<usize>;

    /// Subscribe to inserted notifications. Callers filter by barber id;
    /// this mirrors the shape of the hosted store's publish/subscribe feed.
    fn subscribe_notifications(&self) -> broadcast::Receiver<Notification>;
}

/// The whole store.
#[async_trait]
pub trait FullRepository:
    BarberRepository
    + AvailabilityRepository
    + TimeOffRepository
    + CatalogRepository
    + AppointmentRepository
    + NotificationRepository
{
    /// Cheap connectivity probe for health endpoints.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
