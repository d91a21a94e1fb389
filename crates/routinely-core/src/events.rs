use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSource, RoutineId};
use crate::router::{Screen, Tab};

/// Every state change in the system produces an Event.
/// The presentation layer drains them after each UI event; no-op commands
/// produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Top-level screen changed (tab switches inside Main excluded).
    ScreenChanged { from: Screen, to: Screen },
    TabSelected { tab: Tab },
    SessionStarted { user_id: i64 },
    SessionEnded,
    CatalogLoaded { count: usize, source: CatalogSource },
    HabitAdded { id: RoutineId },
    HabitRemoved { id: RoutineId },
    HabitToggled {
        id: RoutineId,
        completed: bool,
        streak: u32,
    },
    ResetCodeIssued,
    PasswordChanged,
}
