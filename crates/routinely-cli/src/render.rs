//! Plain-text rendering of the current screen.
//!
//! Everything here is derived from `App` state; nothing is stored.

use std::fmt::Write;

use routinely_core::{
    App, AuthForm, AuthMode, CatalogSource, HabitTracker, KeyValueStore, ResetForm, ResetStep,
    RoutineCatalogEntry, Screen, Tab, TrackedHabit,
};

pub const FALLBACK_NOTICE: &str = "(routine service unavailable, showing built-in routines)";

const BAR_WIDTH: usize = 20;

pub fn screen<S: KeyValueStore>(app: &App<S>) -> String {
    match app.screen() {
        Screen::PasswordReset => reset_screen(app.reset_form()),
        Screen::Unauthenticated => auth_screen(app.auth_form()),
        Screen::UnsupportedDevice => unsupported_screen(app.router().breakpoint()),
        Screen::Main { tab } => {
            let mut out = String::new();
            let name = app
                .session()
                .map(|s| s.user().username.as_str())
                .unwrap_or_default();
            let _ = writeln!(out, "Routinely · {name}");
            let _ = writeln!(out, "{}", tab_bar(tab, app.tracker().total_count()));
            match tab {
                Tab::Library => {
                    if app.catalog().source() == CatalogSource::Fallback {
                        let _ = writeln!(out, "{FALLBACK_NOTICE}");
                    }
                    for entry in app.catalog().entries() {
                        let tracked = app.tracker().is_tracked(entry.id);
                        let _ = writeln!(out, "{}", catalog_line(entry, tracked));
                    }
                }
                Tab::MyHabits => out.push_str(&my_habits(app.tracker())),
            }
            out.trim_end().to_string()
        }
    }
}

/// Both tabs, the active one bracketed. "My habits" carries the tracked
/// count once there is at least one.
fn tab_bar(tab: Tab, tracked: usize) -> String {
    let habits = if tracked > 0 {
        format!("My habits ({tracked})")
    } else {
        "My habits".to_string()
    };
    match tab {
        Tab::Library => format!("[Library]  {habits}"),
        Tab::MyHabits => format!(" Library  [{habits}]"),
    }
}

/// One library row: tracked mark, id, emoji, title and category, with the
/// description on the next line.
pub fn catalog_line(entry: &RoutineCatalogEntry, tracked: bool) -> String {
    let mark = if tracked { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{mark} {:>3}  {} {}  ({})",
        entry.id,
        entry.display_emoji(),
        entry.title,
        entry.category
    );
    if !entry.description.is_empty() {
        let _ = write!(line, "\n          {}", entry.description);
    }
    line
}

pub fn my_habits(tracker: &HabitTracker) -> String {
    if tracker.is_empty() {
        return "No habits yet. Pick routines from the Library tab (pick <id>).".to_string();
    }

    let mut out = String::new();
    let pct = tracker.progress_percentage();
    let _ = writeln!(
        out,
        "Today: {}/{}  {}  {}%",
        tracker.completed_count(),
        tracker.total_count(),
        progress_bar(pct),
        pct.round() as u32
    );
    let _ = writeln!(out, "Best streak: {} {}", tracker.best_streak(), days(tracker.best_streak()));
    if tracker.all_completed() {
        let _ = writeln!(out, "All done for today!");
    }
    let _ = writeln!(out);
    for habit in tracker.habits() {
        let _ = writeln!(out, "{}", habit_line(habit));
    }
    out.trim_end().to_string()
}

fn habit_line(habit: &TrackedHabit) -> String {
    let mark = if habit.completed { "[✓]" } else { "[ ]" };
    format!(
        "{mark} {:>3}  {} {}  streak {}",
        habit.id(),
        habit.routine.display_emoji(),
        habit.routine.title,
        habit.streak
    )
}

pub fn progress_bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn days(n: u32) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

fn auth_screen(form: &AuthForm) -> String {
    let mut out = String::new();
    let title = match form.mode {
        AuthMode::Login => "Sign in",
        AuthMode::Register => "Create account",
    };
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "  email:    {}", form.email);
    if form.mode == AuthMode::Register {
        let _ = writeln!(out, "  username: {}", form.username);
    }
    let _ = writeln!(out, "  password: {}", "*".repeat(form.password.chars().count()));
    push_status(&mut out, form.error.as_deref(), form.loading);
    let _ = write!(
        out,
        "login <email> <password> | register <email> <username> <password> | forgot"
    );
    out
}

fn reset_screen(form: &ResetForm) -> String {
    let mut out = String::from("Reset password\n");
    match form.step {
        ResetStep::Email => {
            let _ = writeln!(out, "  email: {}", form.email);
            push_status(&mut out, form.error.as_deref(), form.loading);
            let _ = write!(out, "reset-email <email> | back");
        }
        ResetStep::Code => {
            let _ = writeln!(out, "  code sent to {}", form.email);
            if let Some(code) = &form.demo_code {
                let _ = writeln!(out, "{}", demo_code_notice(code));
            }
            push_status(&mut out, form.error.as_deref(), form.loading);
            let _ = write!(out, "reset-confirm <code> <new password> <confirm> | back");
        }
    }
    out
}

/// The service echoes the reset code for development builds. Shown with a
/// warning so nobody mistakes it for the real delivery channel.
pub fn demo_code_notice(code: &str) -> String {
    format!("  demo code: {code}\n  warning: development preview only; a real service emails this code")
}

fn unsupported_screen(breakpoint: u32) -> String {
    format!(
        "Routinely is built for mobile screens.\n\
         Narrow the window to {breakpoint}px or less to continue (resize <width>)."
    )
}

fn push_status(out: &mut String, error: Option<&str>, loading: bool) {
    if loading {
        let _ = writeln!(out, "  ...");
    }
    if let Some(error) = error {
        let _ = writeln!(out, "  ! {error}  (dismiss)");
    }
}
