//! Weekly availability and its persisted representations.
//!
//! A barber's recurring schedule is a set of selected 30-minute slots per
//! working weekday. Gaps between selected slots are meaningful (breaks), so
//! the exact slot set is the authoritative representation; the derived
//! start/end range exists for storage backends that only keep a contiguous
//! window.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time::{SlotTime, Weekday};

/// The canonical standard-workday template: 09:00-10:30 plus 13:00-18:00,
/// with the 11:00-12:30 ticks left out as the midday break.
pub fn default_template() -> BTreeSet<SlotTime> {
    let mut slots = BTreeSet::new();
    slots.extend(SlotTime::span(slot(9, 0), slot(10, 30)));
    slots.extend(SlotTime::span(slot(13, 0), slot(18, 0)));
    slots
}

fn slot(h: u8, m: u8) -> SlotTime {
    // Template constants are grid-aligned by construction.
    SlotTime::new(h, m).unwrap_or_else(|_| unreachable!("template slot off grid"))
}

/// `(min, max)` of a slot set; `None` when the set is empty.
pub fn compute_range(slots: &BTreeSet<SlotTime>) -> Option<(SlotTime, SlotTime)> {
    Some((*slots.first()?, *slots.last()?))
}

/// Full slot configuration for one barber on one weekday.
///
/// Never empty: an empty selection is represented by the day's absence from
/// [`WeeklyAvailability`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub weekday: Weekday,
    pub slots: BTreeSet<SlotTime>,
}

impl DaySchedule {
    pub fn new(weekday: Weekday, slots: BTreeSet<SlotTime>) -> Self {
        Self { weekday, slots }
    }

    /// Derived `(range_start, range_end)` pair.
    pub fn range(&self) -> Option<(SlotTime, SlotTime)> {
        compute_range(&self.slots)
    }
}

/// Recurring Monday-Saturday schedule for one barber.
///
/// At most one [`DaySchedule`] per weekday; weekdays without a selection are
/// simply absent (absent = unavailable). Sunday has no key in the domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    days: BTreeMap<Weekday, DaySchedule>,
}

impl WeeklyAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days.get(&weekday)
    }

    /// Selected slots for a weekday; empty set when the day is unconfigured.
    pub fn slots(&self, weekday: Weekday) -> BTreeSet<SlotTime> {
        self.days
            .get(&weekday)
            .map(|d| d.slots.clone())
            .unwrap_or_default()
    }

    /// Replace a weekday's selection. An empty set removes the day,
    /// preserving the absent-means-unavailable invariant.
    pub fn set_day(&mut self, weekday: Weekday, slots: BTreeSet<SlotTime>) {
        if slots.is_empty() {
            self.days.remove(&weekday);
        } else {
            self.days.insert(weekday, DaySchedule::new(weekday, slots));
        }
    }

    /// Flip one slot's membership for a weekday. Creates the day implicitly
    /// on first toggle; removing the last slot removes the day.
    pub fn toggle(&mut self, weekday: Weekday, time: SlotTime) {
        let mut slots = self.slots(weekday);
        if !slots.remove(&time) {
            slots.insert(time);
        }
        self.set_day(weekday, slots);
    }

    pub fn clear_day(&mut self, weekday: Weekday) {
        self.days.remove(&weekday);
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DaySchedule> {
        self.days.values()
    }
}

/// Per-date configuration on the calendar axis, overriding the weekly
/// template for that specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayPlan {
    /// The barber works this date with exactly these slots (possibly none
    /// selected yet while the date is being configured).
    Working { slots: BTreeSet<SlotTime> },
    /// The barber is off this date regardless of the weekly template.
    Unavailable,
}

impl DayPlan {
    pub fn slots(&self) -> BTreeSet<SlotTime> {
        match self {
            DayPlan::Working { slots } => slots.clone(),
            DayPlan::Unavailable => BTreeSet::new(),
        }
    }
}

/// Calendar-axis overrides, keyed by date.
pub type DateOverrides = BTreeMap<NaiveDate, DayPlan>;

/// Action applied uniformly to a set of calendar dates in multi-day
/// selection mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BulkAction {
    /// Mark the dates as working days, keeping any slots already configured.
    MarkWorking,
    /// Mark the dates as off.
    MarkUnavailable,
    /// Mark the dates as working with exactly this slot selection.
    SetSlots { slots: BTreeSet<SlotTime> },
    /// Drop the dates' override entirely, falling back to the weekly template.
    RemoveConfiguration,
}

/// Persisted shape of one availability row.
///
/// The exact slot set is preferred; the range-only form exists for legacy
/// rows that stored just the window and cannot represent breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repr", rename_all = "snake_case")]
pub enum AvailabilityRecord {
    ExactSlots { slots: BTreeSet<SlotTime> },
    RangeOnly { start: SlotTime, end: SlotTime },
}

impl AvailabilityRecord {
    /// Reconstruct the slot set.
    ///
    /// Exact for [`AvailabilityRecord::ExactSlots`]. For
    /// [`AvailabilityRecord::RangeOnly`] this enumerates every grid tick
    /// from start to end inclusive, which is lossy: any break inside the
    /// original selection comes back filled in.
    pub fn materialize(&self) -> BTreeSet<SlotTime> {
        match self {
            AvailabilityRecord::ExactSlots { slots } => slots.clone(),
            AvailabilityRecord::RangeOnly { start, end } => {
                SlotTime::span(*start, *end).into_iter().collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u8, m: u8) -> SlotTime {
        SlotTime::new(h, m).unwrap()
    }

    #[test]
    fn test_default_template_shape() {
        let template = default_template();
        assert_eq!(template.len(), 15);
        assert_eq!(
            compute_range(&template),
            Some((t(9, 0), t(18, 0))),
            "range spans the whole day"
        );
        // The midday break is excluded from the exact set.
        for missing in [t(11, 0), t(11, 30), t(12, 0), t(12, 30)] {
            assert!(!template.contains(&missing));
        }
        assert!(template.contains(&t(10, 30)));
        assert!(template.contains(&t(13, 0)));
    }

    #[test]
    fn test_compute_range_empty() {
        assert_eq!(compute_range(&BTreeSet::new()), None);
    }

    #[test]
    fn test_toggle_creates_and_removes_day() {
        let mut week = WeeklyAvailability::new();
        week.toggle(Weekday::Monday, t(9, 0));
        assert_eq!(week.slots(Weekday::Monday).len(), 1);

        week.toggle(Weekday::Monday, t(9, 0));
        assert!(week.day(Weekday::Monday).is_none(), "empty day is dropped");
    }

    #[test]
    fn test_set_day_empty_removes_entry() {
        let mut week = WeeklyAvailability::new();
        week.set_day(Weekday::Friday, default_template());
        week.set_day(Weekday::Friday, BTreeSet::new());
        assert!(week.is_empty());
    }

    #[test]
    fn test_range_only_materialize_fills_the_break() {
        let exact = AvailabilityRecord::ExactSlots {
            slots: default_template(),
        };
        let range_only = AvailabilityRecord::RangeOnly {
            start: t(9, 0),
            end: t(18, 0),
        };

        let from_exact = exact.materialize();
        let from_range = range_only.materialize();

        assert_eq!(from_exact.len(), 15, "exact set keeps the break");
        assert_eq!(from_range.len(), 19, "range fallback is contiguous");
        assert!(from_range.contains(&t(11, 30)));
        assert!(!from_exact.contains(&t(11, 30)));
    }

    #[test]
    fn test_day_plan_slots() {
        assert!(DayPlan::Unavailable.slots().is_empty());
        let plan = DayPlan::Working {
            slots: [t(10, 0)].into_iter().collect(),
        };
        assert_eq!(plan.slots().len(), 1);
    }
}
