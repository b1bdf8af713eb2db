use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::barber::BarberId;
use super::time::SlotTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A customer booking as seen by the admin panel.
///
/// Appointments are created by the customer-facing product through the
/// shared store; the panel only confirms, cancels, and reschedules them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_name: String,
    pub barber_id: BarberId,
    pub service: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub status: AppointmentStatus,
}
