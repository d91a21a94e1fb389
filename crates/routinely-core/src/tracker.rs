//! Habit tracker: the routines a user chose to follow, with daily
//! completion state and streak counters.
//!
//! ## Streak policy
//!
//! ```text
//! completed: false -> true   streak += 1
//! completed: true  -> false  streak unchanged
//! ```
//!
//! Unmarking a habit never lowers its streak, so toggling twice leaves the
//! streak one higher than before.

use serde::{Deserialize, Serialize};

use crate::catalog::{RoutineCatalogEntry, RoutineId};
use crate::events::Event;

/// A catalog entry the user tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedHabit {
    #[serde(flatten)]
    pub routine: RoutineCatalogEntry,
    pub completed: bool,
    pub streak: u32,
}

impl TrackedHabit {
    pub fn new(routine: RoutineCatalogEntry) -> Self {
        Self {
            routine,
            completed: false,
            streak: 0,
        }
    }

    pub fn id(&self) -> RoutineId {
        self.routine.id
    }
}

/// Ordered set of tracked habits, keyed by routine id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitTracker {
    habits: Vec<TrackedHabit>,
}

impl HabitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[TrackedHabit] {
        &self.habits
    }

    pub fn get(&self, id: RoutineId) -> Option<&TrackedHabit> {
        self.habits.iter().find(|h| h.id() == id)
    }

    pub fn is_tracked(&self, id: RoutineId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.habits.iter().filter(|h| h.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.habits.len()
    }

    /// 0.0 .. 100.0; 0 when nothing is tracked.
    pub fn progress_percentage(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        self.completed_count() as f64 / total as f64 * 100.0
    }

    /// Highest streak among tracked habits; 0 when nothing is tracked.
    pub fn best_streak(&self) -> u32 {
        self.habits.iter().map(|h| h.streak).max().unwrap_or(0)
    }

    /// Every tracked habit is done (and there is at least one).
    pub fn all_completed(&self) -> bool {
        !self.habits.is_empty() && self.habits.iter().all(|h| h.completed)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start tracking `entry` at the end of the list. Already-tracked ids
    /// are left untouched.
    pub fn add(&mut self, entry: &RoutineCatalogEntry) -> Option<Event> {
        if self.is_tracked(entry.id) {
            return None;
        }
        self.habits.push(TrackedHabit::new(entry.clone()));
        Some(Event::HabitAdded { id: entry.id })
    }

    pub fn remove(&mut self, id: RoutineId) -> Option<Event> {
        let index = self.habits.iter().position(|h| h.id() == id)?;
        self.habits.remove(index);
        Some(Event::HabitRemoved { id })
    }

    /// Library button: track `entry` if untracked, otherwise stop tracking.
    pub fn toggle_tracked(&mut self, entry: &RoutineCatalogEntry) -> Option<Event> {
        if self.is_tracked(entry.id) {
            self.remove(entry.id)
        } else {
            self.add(entry)
        }
    }

    /// Flip completion; the streak grows only on the way to completed.
    pub fn toggle_complete(&mut self, id: RoutineId) -> Option<Event> {
        let habit = self.habits.iter_mut().find(|h| h.id() == id)?;
        habit.completed = !habit.completed;
        if habit.completed {
            habit.streak = habit.streak.saturating_add(1);
        }
        Some(Event::HabitToggled {
            id,
            completed: habit.completed,
            streak: habit.streak,
        })
    }

    /// Drop every tracked habit.
    pub fn clear(&mut self) {
        self.habits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn routine(id: RoutineId) -> RoutineCatalogEntry {
        RoutineCatalogEntry::new(id, &format!("Routine {id}"), "", Category::Wellness)
    }

    fn tracker_with_streaks(streaks: &[u32]) -> HabitTracker {
        let mut tracker = HabitTracker::new();
        for (i, streak) in streaks.iter().enumerate() {
            tracker.add(&routine(i as RoutineId + 1));
            tracker.habits[i].streak = *streak;
        }
        tracker
    }

    #[test]
    fn add_creates_incomplete_habit_with_zero_streak() {
        let mut tracker = HabitTracker::new();
        assert_eq!(tracker.add(&routine(2)), Some(Event::HabitAdded { id: 2 }));
        let habit = tracker.get(2).unwrap();
        assert!(!habit.completed);
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.routine.title, "Routine 2");
    }

    #[test]
    fn add_ignores_duplicates() {
        let mut tracker = HabitTracker::new();
        tracker.add(&routine(1));
        tracker.toggle_complete(1);
        assert_eq!(tracker.add(&routine(1)), None);
        assert_eq!(tracker.total_count(), 1);
        assert!(tracker.get(1).unwrap().completed);
    }

    #[test]
    fn remove_keeps_survivor_order() {
        let mut tracker = HabitTracker::new();
        for id in [3, 1, 2] {
            tracker.add(&routine(id));
        }
        assert_eq!(tracker.remove(1), Some(Event::HabitRemoved { id: 1 }));
        assert_eq!(tracker.remove(1), None);
        let ids: Vec<_> = tracker.habits().iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn toggle_twice_increments_streak_once() {
        let mut tracker = tracker_with_streaks(&[3]);

        assert_eq!(
            tracker.toggle_complete(1),
            Some(Event::HabitToggled { id: 1, completed: true, streak: 4 })
        );
        assert_eq!(
            tracker.toggle_complete(1),
            Some(Event::HabitToggled { id: 1, completed: false, streak: 4 })
        );
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut tracker = tracker_with_streaks(&[1]);
        assert_eq!(tracker.toggle_complete(99), None);
        assert_eq!(tracker.get(1).unwrap().streak, 1);
    }

    #[test]
    fn progress_is_zero_when_empty() {
        let tracker = HabitTracker::new();
        assert_eq!(tracker.progress_percentage(), 0.0);
        assert_eq!(tracker.best_streak(), 0);
        assert!(!tracker.all_completed());
    }

    #[test]
    fn progress_two_of_three() {
        let mut tracker = tracker_with_streaks(&[0, 0, 0]);
        tracker.toggle_complete(1);
        tracker.toggle_complete(2);
        assert_eq!(tracker.completed_count(), 2);
        assert_eq!(tracker.total_count(), 3);
        assert!((tracker.progress_percentage() - 66.666_666).abs() < 0.01);
        assert!(!tracker.all_completed());

        tracker.toggle_complete(3);
        assert_eq!(tracker.progress_percentage(), 100.0);
        assert!(tracker.all_completed());
    }

    #[test]
    fn best_streak_is_max() {
        let tracker = tracker_with_streaks(&[3, 12, 7]);
        assert_eq!(tracker.best_streak(), 12);
    }

    #[test]
    fn toggle_tracked_adds_then_removes() {
        let mut tracker = HabitTracker::new();
        assert_eq!(tracker.toggle_tracked(&routine(4)), Some(Event::HabitAdded { id: 4 }));
        assert!(tracker.is_tracked(4));
        assert_eq!(tracker.toggle_tracked(&routine(4)), Some(Event::HabitRemoved { id: 4 }));
        assert!(!tracker.is_tracked(4));
    }

    #[test]
    fn serializes_flat_like_catalog_entry() {
        let tracker = tracker_with_streaks(&[5]);
        let json = serde_json::to_value(&tracker.habits()[0]).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["category"], "wellness");
        assert_eq!(json["streak"], 5);
        assert_eq!(json["completed"], false);
    }
}
