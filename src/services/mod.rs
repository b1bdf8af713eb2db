//! Service layer: business logic between the HTTP handlers and the
//! repository traits.

pub mod appointments;
pub mod availability;
pub mod barbers;
pub mod catalog;
pub mod error;
pub mod notifications;
pub mod schedule_editor;
pub mod time_off;

pub use appointments::AppointmentDesk;
pub use availability::{AvailabilityService, ScheduleSnapshot, ScheduleStatus};
pub use barbers::BarberDirectory;
pub use catalog::CatalogService;
pub use error::{ServiceError, ServiceResult};
pub use notifications::NotificationCenter;
pub use schedule_editor::ScheduleEditor;
pub use time_off::TimeOffRegister;
