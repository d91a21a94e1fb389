//! View router.
//!
//! Picks the top-level screen from three inputs: whether the user asked
//! for a password reset, whether a session exists, and how wide the
//! viewport is. The selected tab is remembered separately so it survives
//! a trip through the unsupported-device screen.
//!
//! ## Screen selection (first match wins)
//!
//! ```text
//! reset requested        -> PasswordReset
//! no session             -> Unauthenticated
//! width > breakpoint     -> UnsupportedDevice
//! otherwise              -> Main { tab }
//! ```
//!
//! Every change of screen kind bumps an epoch. Requests remember the epoch
//! they started in so a late response can be recognised and dropped.

use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Widest viewport, in logical pixels, that still counts as mobile.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewport {
    Mobile,
    Unsupported,
}

impl Viewport {
    pub fn classify(width: u32, breakpoint: u32) -> Self {
        if width <= breakpoint {
            Viewport::Mobile
        } else {
            Viewport::Unsupported
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Library,
    MyHabits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    PasswordReset,
    Unauthenticated,
    UnsupportedDevice,
    Main { tab: Tab },
}

impl Screen {
    /// Same screen kind, ignoring the selected tab.
    pub fn same_kind(&self, other: &Screen) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Debug, Clone)]
pub struct ViewRouter {
    breakpoint: u32,
    viewport: Viewport,
    authenticated: bool,
    reset_requested: bool,
    tab: Tab,
    epoch: u64,
}

impl ViewRouter {
    pub fn new(width: u32, breakpoint: u32, authenticated: bool) -> Self {
        Self {
            breakpoint,
            viewport: Viewport::classify(width, breakpoint),
            authenticated,
            reset_requested: false,
            tab: Tab::default(),
            epoch: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn screen(&self) -> Screen {
        if self.reset_requested {
            Screen::PasswordReset
        } else if !self.authenticated {
            Screen::Unauthenticated
        } else if self.viewport == Viewport::Unsupported {
            Screen::UnsupportedDevice
        } else {
            Screen::Main { tab: self.tab }
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn breakpoint(&self) -> u32 {
        self.breakpoint
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Re-classify the viewport after a resize.
    pub fn resize(&mut self, width: u32) -> Option<Event> {
        let viewport = Viewport::classify(width, self.breakpoint);
        self.transition(|r| r.viewport = viewport)
    }

    /// Login screen -> password reset flow.
    pub fn open_password_reset(&mut self) -> Option<Event> {
        if self.screen() != Screen::Unauthenticated {
            return None;
        }
        self.transition(|r| r.reset_requested = true)
    }

    /// Password reset flow -> login screen (back, or reset succeeded).
    pub fn close_password_reset(&mut self) -> Option<Event> {
        self.transition(|r| r.reset_requested = false)
    }

    /// A login or registration succeeded. The tab starts at the library.
    pub fn session_started(&mut self) -> Option<Event> {
        self.transition(|r| {
            r.authenticated = true;
            r.reset_requested = false;
            r.tab = Tab::Library;
        })
    }

    pub fn session_ended(&mut self) -> Option<Event> {
        self.transition(|r| {
            r.authenticated = false;
            r.tab = Tab::Library;
        })
    }

    /// Switch tabs. Only meaningful on the main screen.
    pub fn select_tab(&mut self, tab: Tab) -> Option<Event> {
        if !matches!(self.screen(), Screen::Main { .. }) || self.tab == tab {
            return None;
        }
        self.tab = tab;
        Some(Event::TabSelected { tab })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, apply: impl FnOnce(&mut Self)) -> Option<Event> {
        let from = self.screen();
        apply(self);
        let to = self.screen();
        if from == to {
            return None;
        }
        if !from.same_kind(&to) {
            self.epoch += 1;
        }
        Some(Event::ScreenChanged { from, to })
    }
}
