//! Diesel row types and conversions to/from the domain model.
//!
//! The exact slot set is stored in `slots_json`; a row with `NULL` there is
//! a legacy range-only row and decodes to the lossy
//! [`AvailabilityRecord::RangeOnly`] variant.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{
    appointments, barbers, date_overrides, notifications, services, time_off,
    weekly_availability,
};
use crate::db::models::{AvailabilityRow, DateOverrideRow};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    Appointment, AppointmentStatus, AvailabilityRecord, Barber, BarberId, DayPlan, Notification,
    ServiceItem, SlotTime, TimeOffEntry, Weekday,
};

fn slot_to_time(slot: SlotTime) -> NaiveTime {
    // Slots are grid-aligned by construction, always within 00:00-23:30.
    NaiveTime::from_hms_opt(slot.hour() as u32, slot.minute() as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

fn time_to_slot(time: NaiveTime) -> RepositoryResult<SlotTime> {
    SlotTime::new(time.hour() as u8, time.minute() as u8)
        .map_err(|e| RepositoryError::validation(format!("stored time off the grid: {}", e)))
}

fn weekday_from_i16(weekday: i16) -> RepositoryResult<Weekday> {
    u8::try_from(weekday)
        .ok()
        .and_then(|n| Weekday::try_from(n).ok())
        .ok_or_else(|| {
            RepositoryError::validation(format!("stored weekday out of range: {}", weekday))
        })
}

fn status_to_str(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "pending",
        AppointmentStatus::Confirmed => "confirmed",
        AppointmentStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(status: &str) -> RepositoryResult<AppointmentStatus> {
    match status {
        "pending" => Ok(AppointmentStatus::Pending),
        "confirmed" => Ok(AppointmentStatus::Confirmed),
        "cancelled" => Ok(AppointmentStatus::Cancelled),
        other => Err(RepositoryError::validation(format!(
            "unknown appointment status: {}",
            other
        ))),
    }
}

// ==================== Barbers ====================

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = barbers)]
pub struct BarberRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Barber> for BarberRow {
    fn from(barber: &Barber) -> Self {
        Self {
            id: barber.id.value(),
            name: barber.name.clone(),
            email: barber.email.clone(),
            phone: barber.phone.clone(),
        }
    }
}

impl From<BarberRow> for Barber {
    fn from(row: BarberRow) -> Self {
        Barber {
            id: BarberId::new(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

// ==================== Weekly availability ====================

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = weekly_availability)]
pub struct WeeklyAvailabilityRow {
    pub barber_id: Uuid,
    pub weekday: i16,
    pub range_start: NaiveTime,
    pub range_end: NaiveTime,
    pub slots_json: Option<Value>,
}

impl WeeklyAvailabilityRow {
    pub fn from_domain(row: &AvailabilityRow) -> RepositoryResult<Self> {
        let slots_json = match &row.record {
            AvailabilityRecord::ExactSlots { slots } => Some(
                serde_json::to_value(slots)
                    .map_err(|e| RepositoryError::validation(e.to_string()))?,
            ),
            AvailabilityRecord::RangeOnly { .. } => None,
        };
        Ok(Self {
            barber_id: row.barber_id.value(),
            weekday: row.weekday.number() as i16,
            range_start: slot_to_time(row.range_start),
            range_end: slot_to_time(row.range_end),
            slots_json,
        })
    }

    pub fn into_domain(self) -> RepositoryResult<AvailabilityRow> {
        let range_start = time_to_slot(self.range_start)?;
        let range_end = time_to_slot(self.range_end)?;
        let record = match self.slots_json {
            Some(value) => AvailabilityRecord::ExactSlots {
                slots: serde_json::from_value(value)
                    .map_err(|e| RepositoryError::validation(e.to_string()))?,
            },
            None => AvailabilityRecord::RangeOnly {
                start: range_start,
                end: range_end,
            },
        };
        Ok(AvailabilityRow {
            barber_id: BarberId::new(self.barber_id),
            weekday: weekday_from_i16(self.weekday)?,
            range_start,
            range_end,
            record,
        })
    }
}

// ==================== Date overrides ====================

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = date_overrides)]
pub struct DateOverrideDbRow {
    pub barber_id: Uuid,
    pub date: NaiveDate,
    pub plan_json: Value,
}

impl DateOverrideDbRow {
    pub fn from_domain(row: &DateOverrideRow) -> RepositoryResult<Self> {
        Ok(Self {
            barber_id: row.barber_id.value(),
            date: row.date,
            plan_json: serde_json::to_value(&row.plan)
                .map_err(|e| RepositoryError::validation(e.to_string()))?,
        })
    }

    pub fn into_domain(self) -> RepositoryResult<DateOverrideRow> {
        let plan: DayPlan = serde_json::from_value(self.plan_json)
            .map_err(|e| RepositoryError::validation(e.to_string()))?;
        Ok(DateOverrideRow {
            barber_id: BarberId::new(self.barber_id),
            date: self.date,
            plan,
        })
    }
}

// ==================== Time off ====================

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = time_off)]
pub struct TimeOffRow {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub date: NaiveDate,
    pub reason: String,
}

impl From<&TimeOffEntry> for TimeOffRow {
    fn from(entry: &TimeOffEntry) -> Self {
        Self {
            id: entry.id,
            barber_id: entry.barber_id.value(),
            date: entry.date,
            reason: entry.reason.clone(),
        }
    }
}

impl From<TimeOffRow> for TimeOffEntry {
    fn from(row: TimeOffRow) -> Self {
        TimeOffEntry {
            id: row.id,
            barber_id: BarberId::new(row.barber_id),
            date: row.date,
            reason: row.reason,
        }
    }
}

// ==================== Services ====================

// treat_none_as_null: clearing the description must actually null it out.
#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = services)]
#[diesel(treat_none_as_null = true)]
pub struct ServiceRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i16,
    pub price_cents: i64,
}

impl From<&ServiceItem> for ServiceRow {
    fn from(item: &ServiceItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            duration_min: item.duration_min as i16,
            price_cents: item.price_cents,
        }
    }
}

impl ServiceRow {
    pub fn into_domain(self) -> RepositoryResult<ServiceItem> {
        Ok(ServiceItem {
            id: self.id,
            name: self.name,
            description: self.description,
            duration_min: u16::try_from(self.duration_min).map_err(|_| {
                RepositoryError::validation(format!(
                    "stored duration out of range: {}",
                    self.duration_min
                ))
            })?,
            price_cents: self.price_cents,
        })
    }
}

// ==================== Appointments ====================

#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = appointments)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub client_name: String,
    pub barber_id: Uuid,
    pub service: String,
    pub date: NaiveDate,
    pub time_of_day: NaiveTime,
    pub status: String,
}

impl From<&Appointment> for AppointmentRow {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            client_name: appointment.client_name.clone(),
            barber_id: appointment.barber_id.value(),
            service: appointment.service.clone(),
            date: appointment.date,
            time_of_day: slot_to_time(appointment.time),
            status: status_to_str(appointment.status).to_string(),
        }
    }
}

impl AppointmentRow {
    pub fn into_domain(self) -> RepositoryResult<Appointment> {
        Ok(Appointment {
            id: self.id,
            client_name: self.client_name,
            barber_id: BarberId::new(self.barber_id),
            service: self.service,
            date: self.date,
            time: time_to_slot(self.time_of_day)?,
            status: status_from_str(&self.status)?,
        })
    }
}

// ==================== Notifications ====================

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = notifications)]
pub struct NotificationRow {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            barber_id: notification.barber_id.value(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            barber_id: BarberId::new(row.barber_id),
            title: row.title,
            body: row.body,
            read: row.read,
            created_at: row.created_at,
        }
    }
}
