//! The in-memory schedule editing model.
//!
//! [`ScheduleEditor`] holds one barber's weekly template and calendar-date
//! overrides while the shell edits them. Every mutation is synchronous and
//! validates its input before touching state; nothing is persisted until the
//! owning session saves the whole editor in one replace-all write.
//!
//! The weekday-recurring template is the canonical axis. Calendar dates are
//! handled as per-date overrides layered on top, so both editing modes of
//! the panel (weekday table and calendar multi-select) feed one model.

use chrono::NaiveDate;

use super::error::{ServiceError, ServiceResult};
use crate::db::models::{AvailabilityRow, DateOverrideRow};
use crate::models::{
    default_template, BulkAction, DateOverrides, DayPlan, SlotTime, Weekday, WeeklyAvailability,
};

#[derive(Debug, Clone, Default)]
pub struct ScheduleEditor {
    week: WeeklyAvailability,
    overrides: DateOverrides,
    dirty: bool,
}

impl ScheduleEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an editor from persisted rows. The exact slot set is used
    /// when present; range-only rows fall back to the lossy contiguous
    /// enumeration. The result starts clean.
    pub fn from_rows(weekly: &[AvailabilityRow], overrides: &[DateOverrideRow]) -> Self {
        let mut editor = Self::new();
        for row in weekly {
            editor.week.set_day(row.weekday, row.record.materialize());
        }
        for row in overrides {
            editor.overrides.insert(row.date, row.plan.clone());
        }
        editor.dirty = false;
        editor
    }

    pub fn week(&self) -> &WeeklyAvailability {
        &self.week
    }

    pub fn overrides(&self) -> &DateOverrides {
        &self.overrides
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Flip one slot on the weekly template. Toggling the first slot of an
    /// unconfigured weekday creates its day; removing the last slot drops it.
    pub fn toggle_slot(&mut self, weekday: Weekday, time: SlotTime) {
        self.week.toggle(weekday, time);
        self.dirty = true;
    }

    /// Replace a weekday's selection with the canonical standard-workday
    /// template, unconditionally.
    pub fn apply_default_template(&mut self, weekday: Weekday) {
        self.week.set_day(weekday, default_template());
        self.dirty = true;
    }

    /// Apply the canonical template to all six working weekdays in one
    /// in-memory update.
    pub fn apply_default_template_to_all(&mut self) {
        for weekday in Weekday::ALL {
            self.week.set_day(weekday, default_template());
        }
        self.dirty = true;
    }

    /// Empty a weekday's selection, marking the barber unavailable that day.
    pub fn clear_weekday(&mut self, weekday: Weekday) {
        self.week.clear_day(weekday);
        self.dirty = true;
    }

    /// Flip one slot on a specific date's override, creating a working
    /// override on first use. Dates marked unavailable ignore slot toggles,
    /// matching the calendar editor's behavior.
    pub fn toggle_slot_for_date(&mut self, date: NaiveDate, time: SlotTime) -> ServiceResult<()> {
        reject_sunday(date)?;
        let plan = self
            .overrides
            .entry(date)
            .or_insert_with(|| DayPlan::Working {
                slots: Default::default(),
            });
        if let DayPlan::Working { slots } = plan {
            if !slots.remove(&time) {
                slots.insert(time);
            }
            self.dirty = true;
        }
        Ok(())
    }

    /// Apply one action uniformly to every date of a multi-day selection.
    ///
    /// All dates are validated up front; a Sunday anywhere in the selection
    /// rejects the whole call without mutating anything.
    pub fn apply_bulk_action(
        &mut self,
        dates: &[NaiveDate],
        action: &BulkAction,
    ) -> ServiceResult<()> {
        for date in dates {
            reject_sunday(*date)?;
        }
        if dates.is_empty() {
            return Ok(());
        }

        for date in dates {
            match action {
                BulkAction::MarkWorking => {
                    // An existing working day keeps its slots; anything else
                    // becomes a working day with no selection yet.
                    let keep = matches!(self.overrides.get(date), Some(DayPlan::Working { .. }));
                    if !keep {
                        self.overrides.insert(
                            *date,
                            DayPlan::Working {
                                slots: Default::default(),
                            },
                        );
                    }
                }
                BulkAction::MarkUnavailable => {
                    self.overrides.insert(*date, DayPlan::Unavailable);
                }
                BulkAction::SetSlots { slots } => {
                    self.overrides.insert(
                        *date,
                        DayPlan::Working {
                            slots: slots.clone(),
                        },
                    );
                }
                BulkAction::RemoveConfiguration => {
                    self.overrides.remove(date);
                }
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Persisted weekly rows: one per configured weekday, none for
    /// unconfigured ones. The exact slot set rides along so breaks survive.
    pub fn weekly_rows(&self, barber_id: crate::models::BarberId) -> Vec<AvailabilityRow> {
        self.week
            .iter()
            .filter_map(|day| {
                let (range_start, range_end) = day.range()?;
                Some(AvailabilityRow {
                    barber_id,
                    weekday: day.weekday,
                    range_start,
                    range_end,
                    record: crate::models::AvailabilityRecord::ExactSlots {
                        slots: day.slots.clone(),
                    },
                })
            })
            .collect()
    }

    /// Persisted calendar-override rows.
    pub fn override_rows(&self, barber_id: crate::models::BarberId) -> Vec<DateOverrideRow> {
        self.overrides
            .iter()
            .map(|(date, plan)| DateOverrideRow {
                barber_id,
                date: *date,
                plan: plan.clone(),
            })
            .collect()
    }
}

fn reject_sunday(date: NaiveDate) -> ServiceResult<()> {
    if Weekday::from_date(date).is_none() {
        return Err(ServiceError::validation(format!(
            "{} falls on a Sunday, which is globally non-working",
            date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{compute_range, AvailabilityRecord, BarberId};
    use std::collections::BTreeSet;

    fn t(h: u8, m: u8) -> SlotTime {
        SlotTime::new(h, m).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_double_toggle_restores_original_state() {
        let mut editor = ScheduleEditor::new();
        editor.apply_default_template(Weekday::Tuesday);
        let before = editor.week().slots(Weekday::Tuesday);

        editor.toggle_slot(Weekday::Tuesday, t(15, 30));
        editor.toggle_slot(Weekday::Tuesday, t(15, 30));

        assert_eq!(editor.week().slots(Weekday::Tuesday), before);
    }

    #[test]
    fn test_toggle_implicitly_creates_day() {
        let mut editor = ScheduleEditor::new();
        assert!(editor.week().day(Weekday::Wednesday).is_none());

        editor.toggle_slot(Weekday::Wednesday, t(10, 0));

        let slots = editor.week().slots(Weekday::Wednesday);
        assert_eq!(slots.into_iter().collect::<Vec<_>>(), vec![t(10, 0)]);
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_template_range_and_break() {
        let mut editor = ScheduleEditor::new();
        editor.apply_default_template(Weekday::Monday);

        let slots = editor.week().slots(Weekday::Monday);
        assert_eq!(compute_range(&slots), Some((t(9, 0), t(18, 0))));
        assert!(!slots.contains(&t(11, 0)), "midday break is excluded");
        assert!(!slots.contains(&t(12, 30)));
    }

    #[test]
    fn test_template_to_all_weekdays() {
        let mut editor = ScheduleEditor::new();
        editor.apply_default_template_to_all();
        for weekday in Weekday::ALL {
            assert_eq!(editor.week().slots(weekday), default_template());
        }
    }

    #[test]
    fn test_template_overwrites_existing_selection() {
        let mut editor = ScheduleEditor::new();
        editor.toggle_slot(Weekday::Friday, t(20, 0));
        editor.apply_default_template(Weekday::Friday);
        assert_eq!(editor.week().slots(Weekday::Friday), default_template());
    }

    #[test]
    fn test_clear_weekday_removes_day() {
        let mut editor = ScheduleEditor::new();
        editor.apply_default_template(Weekday::Saturday);
        editor.clear_weekday(Weekday::Saturday);
        assert!(editor.week().day(Weekday::Saturday).is_none());
    }

    #[test]
    fn test_bulk_mark_unavailable() {
        let mut editor = ScheduleEditor::new();
        let dates = [date(2026, 8, 10), date(2026, 8, 11), date(2026, 8, 12)];

        editor
            .apply_bulk_action(&dates, &BulkAction::MarkUnavailable)
            .unwrap();

        for d in dates {
            assert_eq!(editor.overrides().get(&d), Some(&DayPlan::Unavailable));
            assert!(editor.overrides().get(&d).unwrap().slots().is_empty());
        }
    }

    #[test]
    fn test_bulk_rejects_sunday_without_mutation() {
        let mut editor = ScheduleEditor::new();
        // 2026-08-16 is a Sunday.
        let dates = [date(2026, 8, 10), date(2026, 8, 16)];

        let err = editor
            .apply_bulk_action(&dates, &BulkAction::MarkUnavailable)
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(editor.overrides().is_empty(), "fail closed: nothing changed");
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_bulk_set_slots_then_remove_configuration() {
        let mut editor = ScheduleEditor::new();
        let slots: BTreeSet<SlotTime> = [t(10, 0), t(10, 30)].into_iter().collect();
        let dates = [date(2026, 8, 13)];

        editor
            .apply_bulk_action(&dates, &BulkAction::SetSlots { slots: slots.clone() })
            .unwrap();
        assert_eq!(
            editor.overrides().get(&dates[0]),
            Some(&DayPlan::Working { slots })
        );

        editor
            .apply_bulk_action(&dates, &BulkAction::RemoveConfiguration)
            .unwrap();
        assert!(editor.overrides().get(&dates[0]).is_none());
    }

    #[test]
    fn test_bulk_mark_working_keeps_existing_slots() {
        let mut editor = ScheduleEditor::new();
        let d = [date(2026, 8, 14)];
        let slots: BTreeSet<SlotTime> = [t(9, 0)].into_iter().collect();

        editor
            .apply_bulk_action(&d, &BulkAction::SetSlots { slots: slots.clone() })
            .unwrap();
        editor
            .apply_bulk_action(&d, &BulkAction::MarkWorking)
            .unwrap();

        assert_eq!(
            editor.overrides().get(&d[0]),
            Some(&DayPlan::Working { slots }),
            "re-marking a working day must not drop its slots"
        );
    }

    #[test]
    fn test_date_slot_toggle_ignored_on_unavailable_day() {
        let mut editor = ScheduleEditor::new();
        let d = date(2026, 8, 14);
        editor
            .apply_bulk_action(&[d], &BulkAction::MarkUnavailable)
            .unwrap();

        editor.toggle_slot_for_date(d, t(9, 0)).unwrap();
        assert_eq!(editor.overrides().get(&d), Some(&DayPlan::Unavailable));
    }

    #[test]
    fn test_weekly_rows_skip_unconfigured_days() {
        let mut editor = ScheduleEditor::new();
        editor.apply_default_template(Weekday::Monday);
        editor.toggle_slot(Weekday::Thursday, t(16, 0));

        let rows = editor.weekly_rows(BarberId::random());
        assert_eq!(rows.len(), 2);
        let monday = rows.iter().find(|r| r.weekday == Weekday::Monday).unwrap();
        assert_eq!(monday.range_start, t(9, 0));
        assert_eq!(monday.range_end, t(18, 0));
        assert!(matches!(monday.record, AvailabilityRecord::ExactSlots { .. }));
    }

    #[test]
    fn test_from_rows_prefers_exact_slots() {
        let barber_id = BarberId::random();
        let mut editor = ScheduleEditor::new();
        editor.apply_default_template(Weekday::Monday);
        let rows = editor.weekly_rows(barber_id);

        let reloaded = ScheduleEditor::from_rows(&rows, &[]);
        assert_eq!(reloaded.week().slots(Weekday::Monday), default_template());
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn test_from_rows_range_only_fallback_fills_break() {
        let barber_id = BarberId::random();
        let row = AvailabilityRow {
            barber_id,
            weekday: Weekday::Monday,
            range_start: t(9, 0),
            range_end: t(18, 0),
            record: AvailabilityRecord::RangeOnly {
                start: t(9, 0),
                end: t(18, 0),
            },
        };

        let reloaded = ScheduleEditor::from_rows(&[row], &[]);
        let slots = reloaded.week().slots(Weekday::Monday);
        assert_eq!(slots.len(), 19, "contiguous 09:00..=18:00");
        assert!(slots.contains(&t(11, 30)), "the break cannot be recovered");
    }
}
