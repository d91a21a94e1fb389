//! Routine catalog: the read-only, ordered library of routines a user can
//! pick from.

mod entry;
mod loader;
mod seed;

pub use entry::{Category, RoutineCatalogEntry, RoutineId};
pub use loader::load_catalog;
pub use seed::fallback_routines;

use serde::{Deserialize, Serialize};

/// Where the current catalog contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Remote,
    Fallback,
}

/// Ordered catalog for the session. Order is the order the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<RoutineCatalogEntry>,
    source: CatalogSource,
}

impl Catalog {
    pub fn remote(entries: Vec<RoutineCatalogEntry>) -> Self {
        Self {
            entries,
            source: CatalogSource::Remote,
        }
    }

    pub fn fallback() -> Self {
        Self {
            entries: fallback_routines(),
            source: CatalogSource::Fallback,
        }
    }

    pub fn entries(&self) -> &[RoutineCatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: RoutineId) -> Option<&RoutineCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::fallback()
    }
}
