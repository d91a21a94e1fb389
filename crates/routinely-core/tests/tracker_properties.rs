//! Property tests for the habit tracker rules.

use proptest::prelude::*;
use routinely_core::catalog::fallback_routines;
use routinely_core::{HabitTracker, RoutineId};

#[derive(Debug, Clone)]
enum Op {
    Add(RoutineId),
    Remove(RoutineId),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..=10i64).prop_map(Op::Add),
        (1..=10i64).prop_map(Op::Remove),
    ]
}

/// Model: ids in order of first addition since their last removal.
fn expected_ids(ops: &[Op]) -> Vec<RoutineId> {
    let mut ids: Vec<RoutineId> = Vec::new();
    for op in ops {
        match *op {
            Op::Add(id) if !ids.contains(&id) => ids.push(id),
            Op::Add(_) => {}
            Op::Remove(id) => ids.retain(|x| *x != id),
        }
    }
    ids
}

proptest! {
    #[test]
    fn add_remove_sequences_match_model(ops in prop::collection::vec(op(), 0..60)) {
        let catalog = fallback_routines();
        let mut tracker = HabitTracker::new();
        for op in &ops {
            match *op {
                Op::Add(id) => {
                    let entry = catalog.iter().find(|e| e.id == id).unwrap();
                    tracker.add(entry);
                }
                Op::Remove(id) => {
                    tracker.remove(id);
                }
            }
        }

        let ids: Vec<RoutineId> = tracker.habits().iter().map(|h| h.id()).collect();
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), ids.len());
        prop_assert_eq!(ids, expected_ids(&ops));
    }

    #[test]
    fn double_toggle_restores_completion_and_adds_one(
        streak in 0u32..1000,
        start_completed in any::<bool>(),
    ) {
        let entry = fallback_routines().remove(0);
        let mut tracker = HabitTracker::new();
        tracker.add(&entry);
        // Drive the habit to the starting state, then reset the streak.
        if start_completed {
            tracker.toggle_complete(entry.id);
        }
        let mut json = serde_json::to_value(&tracker).unwrap();
        json["habits"][0]["streak"] = streak.into();
        let mut tracker: HabitTracker = serde_json::from_value(json).unwrap();

        tracker.toggle_complete(entry.id);
        tracker.toggle_complete(entry.id);

        let habit = tracker.get(entry.id).unwrap();
        prop_assert_eq!(habit.completed, start_completed);
        prop_assert_eq!(habit.streak, streak + 1);
    }

    #[test]
    fn progress_stays_in_range(done in prop::collection::vec(any::<bool>(), 0..10)) {
        let catalog = fallback_routines();
        let mut tracker = HabitTracker::new();
        for (entry, completed) in catalog.iter().zip(&done) {
            tracker.add(entry);
            if *completed {
                tracker.toggle_complete(entry.id);
            }
        }
        let pct = tracker.progress_percentage();
        prop_assert!((0.0..=100.0).contains(&pct));
        prop_assert_eq!(tracker.completed_count(), done.iter().filter(|d| **d).count());
    }
}
