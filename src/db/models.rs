//! Persisted row shapes exchanged with the repository layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    AppointmentStatus, AvailabilityRecord, BarberId, DayPlan, SlotTime, Weekday,
};

/// One persisted weekly-availability row.
///
/// Emitted only for weekdays with a non-empty selection (absence means the
/// barber is unavailable that weekday). `range_start`/`range_end` are the
/// canonical window for range-only consumers; `record` keeps the exact slot
/// set when the storage layer allows it, so breaks survive a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub barber_id: BarberId,
    pub weekday: Weekday,
    pub range_start: SlotTime,
    pub range_end: SlotTime,
    pub record: AvailabilityRecord,
}

/// One persisted calendar-date override row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverrideRow {
    pub barber_id: BarberId,
    pub date: NaiveDate,
    pub plan: DayPlan,
}

/// Filters for listing appointments; `None` fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub barber_id: Option<BarberId>,
    /// Case-insensitive substring match on the client name.
    #[serde(default)]
    pub client_contains: Option<String>,
}
