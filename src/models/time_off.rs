use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::barber::BarberId;

/// A single calendar-date exception for a barber, independent of the
/// recurring weekly template. Consulted at booking time by the
/// customer-facing product, not merged into the weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffEntry {
    pub id: Uuid,
    pub barber_id: BarberId,
    pub date: NaiveDate,
    pub reason: String,
}
