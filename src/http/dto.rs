//! Data Transfer Objects for the HTTP API.
//!
//! Weekdays and slot times deserialize through their domain serde
//! representations (`1`-`6` and `"HH:MM"`), so malformed values are
//! rejected at the request boundary before any handler runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export domain types that already serialize the way the API needs.
pub use crate::models::{
    Appointment, AppointmentStatus, Barber, BulkAction, Notification, ServiceItem, SlotTime,
    TimeOffEntry, Weekday,
};
pub use crate::services::{ScheduleSnapshot, ScheduleStatus};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Request body for registering a barber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBarberRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Barber list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarberListResponse {
    pub barbers: Vec<Barber>,
    pub total: usize,
}

/// Request body for toggling one weekly slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleSlotRequest {
    pub weekday: Weekday,
    pub time: SlotTime,
}

/// Request body for applying the standard-workday template.
/// Omitting `weekday` applies it to all six working weekdays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyTemplateRequest {
    #[serde(default)]
    pub weekday: Option<Weekday>,
}

/// Request body for clearing one weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearWeekdayRequest {
    pub weekday: Weekday,
}

/// Request body for toggling one slot on a specific calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleDateSlotRequest {
    pub date: NaiveDate,
    pub time: SlotTime,
}

/// Request body for a multi-day bulk action.
///
/// The action is flattened: `{"dates": [...], "action": "set_slots",
/// "slots": ["10:00", "10:30"]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub dates: Vec<NaiveDate>,
    #[serde(flatten)]
    pub action: BulkAction,
}

/// Query for the availability resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveQuery {
    pub date: NaiveDate,
}

/// Resolved bookable slots for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAvailability {
    pub date: NaiveDate,
    pub slots: Vec<SlotTime>,
}

/// Request body for adding a day off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTimeOffRequest {
    pub date: NaiveDate,
    pub reason: String,
}

/// Time-off list response, ascending by date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOffListResponse {
    pub entries: Vec<TimeOffEntry>,
    pub total: usize,
}

/// Request body for creating a catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_min: u16,
    pub price_cents: i64,
}

/// Query parameters for listing appointments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentsQuery {
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub barber_id: Option<Uuid>,
    /// Case-insensitive substring match on the client name.
    #[serde(default)]
    pub client: Option<String>,
}

/// Request body for rescheduling an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
    pub time: SlotTime,
    #[serde(default)]
    pub service: Option<String>,
}

/// Appointment list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
    pub total: usize,
}

/// Notification list response, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub total: usize,
}

/// Response for bulk mark-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}
