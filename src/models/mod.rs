//! Domain model types shared across the service, storage, and HTTP layers.

pub mod appointment;
pub mod availability;
pub mod barber;
pub mod catalog;
pub mod notification;
pub mod time;
pub mod time_off;

pub use appointment::{Appointment, AppointmentStatus};
pub use availability::{
    compute_range, default_template, AvailabilityRecord, BulkAction, DaySchedule, DateOverrides,
    DayPlan, WeeklyAvailability,
};
pub use barber::{Barber, BarberId};
pub use catalog::{ServiceItem, DURATION_OPTIONS_MIN};
pub use notification::Notification;
pub use time::{InvalidSlotTime, InvalidWeekday, SlotTime, Weekday, SLOT_MINUTES};
pub use time_off::TimeOffEntry;
