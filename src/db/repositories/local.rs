//! In-memory repository for unit testing and local development.
//!
//! All state lives behind one `RwLock`, so every mutation is atomic from the
//! caller's point of view; in particular `replace_availability` swaps a
//! barber's whole row set inside a single write-lock critical section,
//! giving the replace-all save its all-or-nothing guarantee for free.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::db::models::{AppointmentFilter, AvailabilityRow, DateOverrideRow};
use crate::db::repository::{
    AppointmentRepository, AvailabilityRepository, BarberRepository, CatalogRepository,
    ErrorContext, FullRepository, NotificationRepository, RepositoryError, RepositoryResult,
    TimeOffRepository,
};
use crate::models::{Appointment, Barber, BarberId, Notification, ServiceItem, TimeOffEntry};

const FEED_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Store {
    barbers: HashMap<BarberId, Barber>,
    weekly: HashMap<BarberId, Vec<AvailabilityRow>>,
    overrides: HashMap<BarberId, Vec<DateOverrideRow>>,
    time_off: Vec<TimeOffEntry>,
    services: HashMap<Uuid, ServiceItem>,
    appointments: HashMap<Uuid, Appointment>,
    notifications: Vec<Notification>,
}

/// In-memory implementation of [`FullRepository`].
#[derive(Debug)]
pub struct LocalRepository {
    store: RwLock<Store>,
    feed: broadcast::Sender<Notification>,
}

impl LocalRepository {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            store: RwLock::new(Store::default()),
            feed,
        }
    }

    fn barber_not_found(id: BarberId) -> RepositoryError {
        RepositoryError::not_found_with_context(
            "barber does not exist",
            ErrorContext::default().with_entity("barber").with_entity_id(id),
        )
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BarberRepository for LocalRepository {
    async fn list_barbers(&self) -> RepositoryResult<Vec<Barber>> {
        let store = self.store.read();
        let mut barbers: Vec<Barber> = store.barbers.values().cloned().collect();
        barbers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(barbers)
    }

    async fn get_barber(&self, id: BarberId) -> RepositoryResult<Barber> {
        self.store
            .read()
            .barbers
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::barber_not_found(id))
    }

    async fn insert_barber(&self, barber: &Barber) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store.barbers.contains_key(&barber.id) {
            return Err(RepositoryError::query_with_context(
                "barber id already exists",
                ErrorContext::new("insert_barber")
                    .with_entity("barber")
                    .with_entity_id(barber.id),
            ));
        }
        store.barbers.insert(barber.id, barber.clone());
        Ok(())
    }

    async fn delete_barber(&self, id: BarberId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store.barbers.remove(&id).is_none() {
            return Err(Self::barber_not_found(id));
        }
        store.weekly.remove(&id);
        store.overrides.remove(&id);
        store.time_off.retain(|entry| entry.barber_id != id);
        store.notifications.retain(|n| n.barber_id != id);
        Ok(())
    }

    async fn count_barbers(&self) -> RepositoryResult<usize> {
        Ok(self.store.read().barbers.len())
    }
}

#[async_trait]
impl AvailabilityRepository for LocalRepository {
    async fn fetch_weekly_rows(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<AvailabilityRow>> {
        Ok(self
            .store
            .read()
            .weekly
            .get(&barber_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_date_overrides(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<DateOverrideRow>> {
        Ok(self
            .store
            .read()
            .overrides
            .get(&barber_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_availability(
        &self,
        barber_id: BarberId,
        weekly: Vec<AvailabilityRow>,
        overrides: Vec<DateOverrideRow>,
    ) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if !store.barbers.contains_key(&barber_id) {
            return Err(Self::barber_not_found(barber_id));
        }
        store.weekly.insert(barber_id, weekly);
        store.overrides.insert(barber_id, overrides);
        Ok(())
    }
}

#[async_trait]
impl TimeOffRepository for LocalRepository {
    async fn list_time_off(&self, barber_id: BarberId) -> RepositoryResult<Vec<TimeOffEntry>> {
        let store = self.store.read();
        let mut entries: Vec<TimeOffEntry> = store
            .time_off
            .iter()
            .filter(|entry| entry.barber_id == barber_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.date, entry.id));
        Ok(entries)
    }

    async fn insert_time_off(&self, entry: &TimeOffEntry) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if !store.barbers.contains_key(&entry.barber_id) {
            return Err(Self::barber_not_found(entry.barber_id));
        }
        store.time_off.push(entry.clone());
        Ok(())
    }

    async fn delete_time_off(&self, entry_id: Uuid) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let before = store.time_off.len();
        store.time_off.retain(|entry| entry.id != entry_id);
        if store.time_off.len() == before {
            return Err(RepositoryError::not_found_with_context(
                "time-off entry does not exist",
                ErrorContext::default()
                    .with_entity("time_off")
                    .with_entity_id(entry_id),
            ));
        }
        Ok(())
    }

    async fn time_off_exists(
        &self,
        barber_id: BarberId,
        date: NaiveDate,
    ) -> RepositoryResult<bool> {
        Ok(self
            .store
            .read()
            .time_off
            .iter()
            .any(|entry| entry.barber_id == barber_id && entry.date == date))
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn list_services(&self) -> RepositoryResult<Vec<ServiceItem>> {
        let store = self.store.read();
        let mut services: Vec<ServiceItem> = store.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(services)
    }

    async fn insert_service(&self, service: &ServiceItem) -> RepositoryResult<()> {
        self.store
            .write()
            .services
            .insert(service.id, service.clone());
        Ok(())
    }

    async fn update_service(&self, service: &ServiceItem) -> RepositoryResult<()> {
        let mut store = self.store.write();
        match store.services.get_mut(&service.id) {
            Some(existing) => {
                *existing = service.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                "service does not exist",
                ErrorContext::default()
                    .with_entity("service")
                    .with_entity_id(service.id),
            )),
        }
    }

    async fn delete_service(&self, id: Uuid) -> RepositoryResult<()> {
        if self.store.write().services.remove(&id).is_none() {
            return Err(RepositoryError::not_found_with_context(
                "service does not exist",
                ErrorContext::default().with_entity("service").with_entity_id(id),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for LocalRepository {
    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> RepositoryResult<Vec<Appointment>> {
        let store = self.store.read();
        let needle = filter.client_contains.as_deref().map(str::to_lowercase);
        let mut appointments: Vec<Appointment> = store
            .appointments
            .values()
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .filter(|a| filter.barber_id.map_or(true, |b| a.barber_id == b))
            .filter(|a| {
                needle
                    .as_deref()
                    .map_or(true, |n| a.client_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.date, a.time, a.id));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: Uuid) -> RepositoryResult<Appointment> {
        self.store.read().appointments.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "appointment does not exist",
                ErrorContext::default()
                    .with_entity("appointment")
                    .with_entity_id(id),
            )
        })
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> RepositoryResult<()> {
        self.store
            .write()
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(())
    }

    async fn update_appointment(&self, appointment: &Appointment) -> RepositoryResult<()> {
        let mut store = self.store.write();
        match store.appointments.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                "appointment does not exist",
                ErrorContext::default()
                    .with_entity("appointment")
                    .with_entity_id(appointment.id),
            )),
        }
    }
}

#[async_trait]
impl NotificationRepository for LocalRepository {
    async fn list_notifications(
        &self,
        barber_id: BarberId,
    ) -> RepositoryResult<Vec<Notification>> {
        let store = self.store.read();
        let mut notifications: Vec<Notification> = store
            .notifications
            .iter()
            .filter(|n| n.barber_id == barber_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(notifications)
    }

    async fn insert_notification(&self, notification: &Notification) -> RepositoryResult<()> {
        {
            let mut store = self.store.write();
            if !store.barbers.contains_key(&notification.barber_id) {
                return Err(Self::barber_not_found(notification.barber_id));
            }
            store.notifications.push(notification.clone());
        }
        // Nobody listening is fine; the feed is best-effort.
        let _ = self.feed.send(notification.clone());
        Ok(())
    }

    async fn mark_notification_read(&self, id: Uuid) -> RepositoryResult<()> {
        let mut store = self.store.write();
        match store.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                "notification does not exist",
                ErrorContext::default()
                    .with_entity("notification")
                    .with_entity_id(id),
            )),
        }
    }

    async fn mark_all_read(&self, barber_id: BarberId) -> RepositoryResult<usize> {
        let mut store = self.store.write();
        let mut changed = 0;
        for notification in store
            .notifications
            .iter_mut()
            .filter(|n| n.barber_id == barber_id && !n.read)
        {
            notification.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.feed.subscribe()
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
