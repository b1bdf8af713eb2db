//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::FullRepository;
use crate::services::{
    AppointmentDesk, AvailabilityService, BarberDirectory, CatalogService, NotificationCenter,
    TimeOffRegister,
};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub availability: Arc<AvailabilityService>,
    pub barbers: Arc<BarberDirectory>,
    pub time_off: Arc<TimeOffRegister>,
    pub catalog: Arc<CatalogService>,
    pub appointments: Arc<AppointmentDesk>,
    pub notifications: Arc<NotificationCenter>,
}

impl AppState {
    /// Wire every service onto one repository instance.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            availability: Arc::new(AvailabilityService::new(repository.clone())),
            barbers: Arc::new(BarberDirectory::new(repository.clone())),
            time_off: Arc::new(TimeOffRegister::new(repository.clone())),
            catalog: Arc::new(CatalogService::new(repository.clone())),
            appointments: Arc::new(AppointmentDesk::new(repository.clone())),
            notifications: Arc::new(NotificationCenter::new(repository.clone())),
            repository,
        }
    }
}
