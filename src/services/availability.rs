//! Per-barber schedule sessions and replace-all persistence.
//!
//! [`AvailabilityService`] owns one [`ScheduleEditor`] per barber being
//! edited. Mutations are synchronous against the session; only `load` and
//! `save` touch the repository. While a save is in flight for a barber,
//! every further mutation and save for that barber is rejected with
//! [`ServiceError::SaveInProgress`] so the delete-then-insert replace-all
//! can never race a concurrent edit. The in-flight flag is cleared by a
//! drop guard, so an abandoned save leaves the session dirty and editable
//! again rather than wedged.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::error::{ServiceError, ServiceResult};
use super::schedule_editor::ScheduleEditor;
use crate::db::{
    AvailabilityRepository, BarberRepository, FullRepository, TimeOffRepository,
};
use crate::models::{BarberId, BulkAction, DateOverrides, SlotTime, Weekday, WeeklyAvailability};

/// Session flags surfaced to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStatus {
    pub dirty: bool,
    pub saving: bool,
}

/// Everything the shell needs to render the schedule editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub week: WeeklyAvailability,
    pub overrides: DateOverrides,
    pub status: ScheduleStatus,
}

struct Session {
    editor: ScheduleEditor,
    saving: bool,
}

impl Session {
    fn status(&self) -> ScheduleStatus {
        ScheduleStatus {
            dirty: self.editor.is_dirty(),
            saving: self.saving,
        }
    }
}

/// The availability model: in-memory editing sessions plus persistence.
pub struct AvailabilityService {
    repo: Arc<dyn FullRepository>,
    sessions: Mutex<HashMap<BarberId, Session>>,
}

impl AvailabilityService {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self {
            repo,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Load (or reload) a barber's session from the store, discarding any
    /// unsaved in-memory edits. Rejected while a save is in flight.
    pub async fn load(&self, barber_id: BarberId) -> ServiceResult<ScheduleSnapshot> {
        self.repo.get_barber(barber_id).await?;
        let weekly = self.repo.fetch_weekly_rows(barber_id).await?;
        let overrides = self.repo.fetch_date_overrides(barber_id).await?;
        let editor = ScheduleEditor::from_rows(&weekly, &overrides);

        let mut sessions = self.sessions.lock();
        if sessions.get(&barber_id).is_some_and(|s| s.saving) {
            return Err(ServiceError::SaveInProgress(barber_id));
        }
        let session = Session {
            editor,
            saving: false,
        };
        let snapshot = snapshot_of(&session);
        sessions.insert(barber_id, session);
        Ok(snapshot)
    }

    /// Current snapshot, loading the session from the store on first use.
    pub async fn snapshot(&self, barber_id: BarberId) -> ServiceResult<ScheduleSnapshot> {
        self.ensure_loaded(barber_id).await?;
        let sessions = self.sessions.lock();
        let session = sessions
            .get(&barber_id)
            .ok_or_else(|| ServiceError::not_found("schedule session disappeared"))?;
        Ok(snapshot_of(session))
    }

    pub async fn toggle_slot(
        &self,
        barber_id: BarberId,
        weekday: Weekday,
        time: SlotTime,
    ) -> ServiceResult<ScheduleStatus> {
        self.mutate(barber_id, |editor| {
            editor.toggle_slot(weekday, time);
            Ok(())
        })
        .await
    }

    pub async fn apply_default_template(
        &self,
        barber_id: BarberId,
        weekday: Weekday,
    ) -> ServiceResult<ScheduleStatus> {
        self.mutate(barber_id, |editor| {
            editor.apply_default_template(weekday);
            Ok(())
        })
        .await
    }

    pub async fn apply_default_template_to_all(
        &self,
        barber_id: BarberId,
    ) -> ServiceResult<ScheduleStatus> {
        self.mutate(barber_id, |editor| {
            editor.apply_default_template_to_all();
            Ok(())
        })
        .await
    }

    pub async fn clear_weekday(
        &self,
        barber_id: BarberId,
        weekday: Weekday,
    ) -> ServiceResult<ScheduleStatus> {
        self.mutate(barber_id, |editor| {
            editor.clear_weekday(weekday);
            Ok(())
        })
        .await
    }

    pub async fn toggle_slot_for_date(
        &self,
        barber_id: BarberId,
        date: NaiveDate,
        time: SlotTime,
    ) -> ServiceResult<ScheduleStatus> {
        self.mutate(barber_id, |editor| editor.toggle_slot_for_date(date, time))
            .await
    }

    pub async fn apply_bulk_action(
        &self,
        barber_id: BarberId,
        dates: &[NaiveDate],
        action: &BulkAction,
    ) -> ServiceResult<ScheduleStatus> {
        self.mutate(barber_id, |editor| editor.apply_bulk_action(dates, action))
            .await
    }

    /// Persist the session with replace-all semantics.
    ///
    /// On success the session becomes clean; on failure the prior in-memory
    /// state stays intact and dirty for the caller to retry. No automatic
    /// retries here.
    pub async fn save(&self, barber_id: BarberId) -> ServiceResult<ScheduleStatus> {
        let (weekly, overrides) = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get_mut(&barber_id)
                .ok_or_else(|| ServiceError::not_found("no schedule session loaded"))?;
            if session.saving {
                return Err(ServiceError::SaveInProgress(barber_id));
            }
            session.saving = true;
            (
                session.editor.weekly_rows(barber_id),
                session.editor.override_rows(barber_id),
            )
        };

        let _guard = SaveGuard {
            sessions: &self.sessions,
            barber_id,
        };

        let result = self.repo.replace_availability(barber_id, weekly, overrides).await;

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&barber_id)
            .ok_or_else(|| ServiceError::not_found("schedule session disappeared"))?;
        match result {
            Ok(()) => {
                session.editor.mark_clean();
                Ok(ScheduleStatus {
                    dirty: false,
                    saving: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Effective bookable slots for one calendar date, from persisted state.
    ///
    /// Resolution order: Sunday → none; a time-off entry → none; a calendar
    /// override decides next; otherwise the weekly template for the date's
    /// weekday; otherwise none.
    pub async fn resolve_availability(
        &self,
        barber_id: BarberId,
        date: NaiveDate,
    ) -> ServiceResult<BTreeSet<SlotTime>> {
        self.repo.get_barber(barber_id).await?;

        let weekday = match Weekday::from_date(date) {
            Some(weekday) => weekday,
            None => return Ok(BTreeSet::new()),
        };

        if self.repo.time_off_exists(barber_id, date).await? {
            return Ok(BTreeSet::new());
        }

        let overrides = self.repo.fetch_date_overrides(barber_id).await?;
        if let Some(row) = overrides.iter().find(|row| row.date == date) {
            return Ok(row.plan.slots());
        }

        let weekly = self.repo.fetch_weekly_rows(barber_id).await?;
        Ok(weekly
            .iter()
            .find(|row| row.weekday == weekday)
            .map(|row| row.record.materialize())
            .unwrap_or_default())
    }

    async fn ensure_loaded(&self, barber_id: BarberId) -> ServiceResult<()> {
        if self.sessions.lock().contains_key(&barber_id) {
            return Ok(());
        }
        // Loaded outside the lock; a concurrent first load wins harmlessly.
        self.repo.get_barber(barber_id).await?;
        let weekly = self.repo.fetch_weekly_rows(barber_id).await?;
        let overrides = self.repo.fetch_date_overrides(barber_id).await?;
        self.sessions.lock().entry(barber_id).or_insert(Session {
            editor: ScheduleEditor::from_rows(&weekly, &overrides),
            saving: false,
        });
        Ok(())
    }

    async fn mutate<F>(&self, barber_id: BarberId, f: F) -> ServiceResult<ScheduleStatus>
    where
        F: FnOnce(&mut ScheduleEditor) -> ServiceResult<()>,
    {
        self.ensure_loaded(barber_id).await?;
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&barber_id)
            .ok_or_else(|| ServiceError::not_found("schedule session disappeared"))?;
        if session.saving {
            return Err(ServiceError::SaveInProgress(barber_id));
        }
        f(&mut session.editor)?;
        Ok(session.status())
    }
}

fn snapshot_of(session: &Session) -> ScheduleSnapshot {
    ScheduleSnapshot {
        week: session.editor.week().clone(),
        overrides: session.editor.overrides().clone(),
        status: session.status(),
    }
}

/// Clears the in-flight flag when the save future settles or is dropped.
struct SaveGuard<'a> {
    sessions: &'a Mutex<HashMap<BarberId, Session>>,
    barber_id: BarberId,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.sessions.lock().get_mut(&self.barber_id) {
            session.saving = false;
        }
    }
}
