//! # Routinely Core Library
//!
//! Client-side state for the Routinely habit tracker. The `routinely` CLI
//! is a thin presentation layer over this crate; everything it shows is
//! derived from an [`App`].
//!
//! ## Architecture
//!
//! - **Session**: identity plus bearer token, persisted to a key-value store
//! - **Catalog**: the routine library, fetched remotely with a built-in
//!   fallback list
//! - **Tracker**: the routines a user follows, with completion and streaks
//! - **Router**: picks the top-level screen from session, reset request and
//!   viewport width
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`App`]: state container driven by the presentation layer
//! - [`ApiClient`]: HTTP client for the auth and catalog endpoints
//! - [`HabitTracker`]: add/remove/toggle rules
//! - [`ViewRouter`]: screen state machine

pub mod api;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod events;
pub mod router;
pub mod session;
pub mod storage;
pub mod tracker;

pub use api::{ApiClient, AuthRequest, ResetTicket};
pub use app::{App, Ticket, VerifyOutcome};
pub use auth::{AuthField, AuthForm, AuthMode, ResetField, ResetForm, ResetStep};
pub use catalog::{Catalog, CatalogSource, Category, RoutineCatalogEntry, RoutineId};
pub use error::{AuthError, CatalogError, ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use router::{Screen, Tab, ViewRouter, Viewport, MOBILE_BREAKPOINT};
pub use session::{Session, SessionStore, User};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use tracker::{HabitTracker, TrackedHabit};
