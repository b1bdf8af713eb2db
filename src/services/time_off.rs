//! The time-off register: calendar-date exceptions per barber.
//!
//! Entries are independent of the weekly template; they are an exception
//! list consulted at booking time. Each date is an individually created
//! record, never a bulk range.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::db::{BarberRepository, FullRepository, TimeOffRepository};
use crate::models::{BarberId, TimeOffEntry, Weekday};

pub struct TimeOffRegister {
    repo: Arc<dyn FullRepository>,
}

impl TimeOffRegister {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self { repo }
    }

    /// Add a day off for a barber.
    ///
    /// Rejected for Sundays (already globally non-working), empty reasons,
    /// and duplicate `(barber, date)` pairs. Nothing is written on
    /// rejection.
    pub async fn add_time_off(
        &self,
        barber_id: BarberId,
        date: NaiveDate,
        reason: &str,
    ) -> ServiceResult<TimeOffEntry> {
        self.repo.get_barber(barber_id).await?;

        if Weekday::from_date(date).is_none() {
            return Err(ServiceError::validation(format!(
                "{} falls on a Sunday, which is already a non-working day",
                date
            )));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::validation("a reason is required"));
        }
        if self.repo.time_off_exists(barber_id, date).await? {
            return Err(ServiceError::validation(format!(
                "time off for {} already registered",
                date
            )));
        }

        let entry = TimeOffEntry {
            id: Uuid::new_v4(),
            barber_id,
            date,
            reason: reason.to_string(),
        };
        self.repo.insert_time_off(&entry).await?;
        Ok(entry)
    }

    /// Delete one entry. Deleting an unknown id fails with `NotFound`
    /// rather than silently succeeding.
    pub async fn remove_time_off(&self, entry_id: Uuid) -> ServiceResult<()> {
        self.repo.delete_time_off(entry_id).await?;
        Ok(())
    }

    /// Entries for a barber, ascending by date.
    pub async fn list_time_off(&self, barber_id: BarberId) -> ServiceResult<Vec<TimeOffEntry>> {
        self.repo.get_barber(barber_id).await?;
        Ok(self.repo.list_time_off(barber_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BarberRepository, LocalRepository};
    use crate::models::Barber;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded() -> (TimeOffRegister, BarberId) {
        let repo = Arc::new(LocalRepository::new());
        let barber = Barber {
            id: BarberId::random(),
            name: "Miguel".into(),
            email: "miguel@example.com".into(),
            phone: "5559876".into(),
        };
        repo.insert_barber(&barber).await.unwrap();
        (TimeOffRegister::new(repo), barber.id)
    }

    #[tokio::test]
    async fn test_sunday_time_off_rejected() {
        let (register, barber_id) = seeded().await;
        // 2026-08-09 is a Sunday.
        let err = register
            .add_time_off(barber_id, date(2026, 8, 9), "Vacaciones")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(register.list_time_off(barber_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_weekday_time_off_listed_in_date_order() {
        let (register, barber_id) = seeded().await;

        register
            .add_time_off(barber_id, date(2026, 8, 21), "Trámite")
            .await
            .unwrap();
        let monday = register
            .add_time_off(barber_id, date(2026, 8, 10), "Vacaciones")
            .await
            .unwrap();

        let entries = register.list_time_off(barber_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, monday.id, "earlier date sorts first");
        assert_eq!(entries[0].date, date(2026, 8, 10));
    }

    #[tokio::test]
    async fn test_duplicate_date_rejected() {
        let (register, barber_id) = seeded().await;
        register
            .add_time_off(barber_id, date(2026, 8, 10), "Vacaciones")
            .await
            .unwrap();

        let err = register
            .add_time_off(barber_id, date(2026, 8, 10), "Otra vez")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(register.list_time_off(barber_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_entry_is_not_found() {
        let (register, _) = seeded().await;
        let err = register.remove_time_off(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_existing_entry() {
        let (register, barber_id) = seeded().await;
        let entry = register
            .add_time_off(barber_id, date(2026, 8, 12), "Congreso")
            .await
            .unwrap();

        register.remove_time_off(entry.id).await.unwrap();
        assert!(register.list_time_off(barber_id).await.unwrap().is_empty());
    }
}
