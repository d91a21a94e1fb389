//! Application state container.
//!
//! [`App`] owns every piece of client state: router, session, catalog,
//! tracker and the two forms. The presentation layer holds one `App`,
//! forwards user actions to it and re-renders from its accessors. State
//! changes are queued as [`Event`]s and drained by the caller.
//!
//! Network work is split in two halves so a caller can await the request
//! without holding the state:
//!
//! ```text
//! begin_*   validate, mark loading, hand out a Ticket and the request
//! (await)   ApiClient call
//! finish_*  apply the response, unless the Ticket is stale
//! ```
//!
//! A ticket is stale once the router's epoch has moved, i.e. the user left
//! the screen that issued the request. Each form also remembers the ticket
//! it is waiting on; only that ticket may clear the form's loading flag, so
//! a late answer to an abandoned request cannot unlock a newer one.

use tracing::{debug, info, warn};

use crate::api::{ApiClient, AuthRequest, ResetTicket};
use crate::auth::{AuthForm, ResetForm, ResetStep};
use crate::catalog::{self, Catalog, RoutineId};
use crate::error::{AuthError, StorageError};
use crate::events::Event;
use crate::router::{Screen, Tab, ViewRouter};
use crate::session::{Session, SessionStore, User};
use crate::storage::KeyValueStore;
use crate::tracker::HabitTracker;

/// Proof that a request was started in a given router epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    seq: u64,
}

/// Result of checking the stored token against the service.
#[derive(Debug)]
pub enum VerifyOutcome {
    NoSession,
    Valid(User),
    /// The service rejected the token; the session was cleared.
    Revoked,
    /// The service could not be asked. The session is kept.
    Unreachable(AuthError),
}

pub struct App<S: KeyValueStore> {
    router: ViewRouter,
    session: SessionStore<S>,
    catalog: Catalog,
    tracker: HabitTracker,
    auth_form: AuthForm,
    reset_form: ResetForm,
    auth_in_flight: Option<Ticket>,
    reset_in_flight: Option<Ticket>,
    issued: u64,
    events: Vec<Event>,
}

impl<S: KeyValueStore> App<S> {
    /// Hydrate the session from `store` and pick the starting screen.
    pub fn new(store: S, width: u32, breakpoint: u32) -> Self {
        let session = SessionStore::hydrate(store);
        let router = ViewRouter::new(width, breakpoint, session.is_authenticated());
        debug!(screen = ?router.screen(), "app started");
        Self {
            router,
            session,
            catalog: Catalog::default(),
            tracker: HabitTracker::new(),
            auth_form: AuthForm::default(),
            reset_form: ResetForm::default(),
            auth_in_flight: None,
            reset_in_flight: None,
            issued: 0,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn screen(&self) -> Screen {
        self.router.screen()
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn store(&self) -> &S {
        self.session.backend()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &HabitTracker {
        &self.tracker
    }

    pub fn auth_form(&self) -> &AuthForm {
        &self.auth_form
    }

    /// Field edits go straight to the form; its setters clear the error.
    pub fn auth_form_mut(&mut self) -> &mut AuthForm {
        &mut self.auth_form
    }

    pub fn reset_form(&self) -> &ResetForm {
        &self.reset_form
    }

    pub fn reset_form_mut(&mut self) -> &mut ResetForm {
        &mut self.reset_form
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn resize(&mut self, width: u32) {
        let event = self.router.resize(width);
        self.emit(event);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        let event = self.router.select_tab(tab);
        self.emit(event);
    }

    /// "Forgot password" on the login screen.
    pub fn show_password_reset(&mut self) {
        let event = self.router.open_password_reset();
        if event.is_some() {
            self.reset_form = ResetForm::default();
            self.reset_in_flight = None;
        }
        self.emit(event);
    }

    /// "Back" on the reset screen.
    pub fn back_to_login(&mut self) {
        if self.screen() != Screen::PasswordReset {
            return;
        }
        let event = self.router.close_password_reset();
        self.reset_form = ResetForm::default();
        self.reset_in_flight = None;
        self.emit(event);
    }

    /// Dismiss whichever inline error is showing.
    pub fn dismiss_error(&mut self) {
        self.auth_form.dismiss_error();
        self.reset_form.dismiss_error();
    }

    // ── Login / registration ─────────────────────────────────────────

    /// Validate the auth form and start a request.
    ///
    /// Returns `None` when not on the login screen, when a request is
    /// already in flight, or when validation failed (the error is stored on
    /// the form).
    pub fn begin_auth(&mut self) -> Option<(Ticket, AuthRequest)> {
        if self.screen() != Screen::Unauthenticated || self.auth_form.loading {
            return None;
        }
        match self.auth_form.to_request() {
            Ok(request) => {
                self.auth_form.error = None;
                self.auth_form.loading = true;
                let ticket = self.ticket();
                self.auth_in_flight = Some(ticket);
                Some((ticket, request))
            }
            Err(err) => {
                self.auth_form.error = Some(err.to_string());
                None
            }
        }
    }

    /// Apply a login/register response.
    ///
    /// # Errors
    /// Returns an error when the session could not be persisted. The error
    /// is also shown on the form and the user stays logged out.
    pub fn finish_auth(
        &mut self,
        ticket: Ticket,
        result: Result<Session, AuthError>,
    ) -> Result<(), StorageError> {
        if settle(&mut self.auth_in_flight, ticket) {
            self.auth_form.loading = false;
        }
        if self.is_stale(ticket, "auth") {
            return Ok(());
        }

        let session = match result {
            Ok(session) => session,
            Err(err) => {
                self.auth_form.error = Some(err.to_string());
                return Ok(());
            }
        };

        let user_id = session.user().id;
        if let Err(err) = self.session.establish(session) {
            self.auth_form.error = Some(err.to_string());
            return Err(err);
        }

        self.auth_form = AuthForm::default();
        self.tracker.clear();
        let event = self.router.session_started();
        self.emit(event);
        self.events.push(Event::SessionStarted { user_id });
        Ok(())
    }

    pub async fn submit_auth(&mut self, api: &ApiClient) -> Result<(), StorageError> {
        let Some((ticket, request)) = self.begin_auth() else {
            return Ok(());
        };
        let result = api.authenticate(&request).await;
        self.finish_auth(ticket, result)
    }

    // ── Password reset ───────────────────────────────────────────────

    /// Phase 1: ask the service to issue a reset code.
    pub fn begin_reset_request(&mut self) -> Option<(Ticket, AuthRequest)> {
        if !self.reset_step_ready(ResetStep::Email) {
            return None;
        }
        match self.reset_form.to_code_request() {
            Ok(request) => Some((self.start_reset(), request)),
            Err(err) => {
                self.reset_form.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn finish_reset_request(&mut self, ticket: Ticket, result: Result<ResetTicket, AuthError>) {
        if settle(&mut self.reset_in_flight, ticket) {
            self.reset_form.loading = false;
        }
        if self.is_stale(ticket, "reset request") {
            return;
        }
        match result {
            Ok(issued) => {
                if issued.demo_code.is_some() {
                    warn!("service returned the reset code in its response");
                }
                self.reset_form.demo_code = issued.demo_code;
                self.reset_form.step = ResetStep::Code;
                self.events.push(Event::ResetCodeIssued);
            }
            Err(err) => self.reset_form.error = Some(err.to_string()),
        }
    }

    pub async fn submit_reset_request(&mut self, api: &ApiClient) {
        let Some((ticket, request)) = self.begin_reset_request() else {
            return;
        };
        if let AuthRequest::ResetPassword { email } = &request {
            let result = api.request_password_reset(email).await;
            self.finish_reset_request(ticket, result);
        }
    }

    /// Phase 2: submit code and new password. Local validation failures
    /// never produce a request.
    pub fn begin_reset_confirm(&mut self) -> Option<(Ticket, AuthRequest)> {
        if !self.reset_step_ready(ResetStep::Code) {
            return None;
        }
        match self.reset_form.to_confirm_request() {
            Ok(request) => Some((self.start_reset(), request)),
            Err(err) => {
                self.reset_form.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn finish_reset_confirm(&mut self, ticket: Ticket, result: Result<(), AuthError>) {
        if settle(&mut self.reset_in_flight, ticket) {
            self.reset_form.loading = false;
        }
        if self.is_stale(ticket, "reset confirm") {
            return;
        }
        match result {
            Ok(()) => {
                info!("password changed");
                self.reset_form = ResetForm::default();
                let event = self.router.close_password_reset();
                self.emit(event);
                self.events.push(Event::PasswordChanged);
            }
            Err(err) => self.reset_form.error = Some(err.to_string()),
        }
    }

    pub async fn submit_reset_confirm(&mut self, api: &ApiClient) {
        let Some((ticket, request)) = self.begin_reset_confirm() else {
            return;
        };
        if let AuthRequest::ConfirmReset {
            email,
            reset_code,
            new_password,
        } = &request
        {
            let result = api
                .confirm_password_reset(email, reset_code, new_password)
                .await;
            self.finish_reset_confirm(ticket, result);
        }
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Sign out: forget the session, the tracked habits and any form input.
    ///
    /// In-memory state is always reset. The error, if any, reports a key
    /// that could not be removed from storage.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        let was_authenticated = self.session.is_authenticated();
        let cleared = self.session.clear();

        self.tracker.clear();
        self.auth_form = AuthForm::default();
        self.reset_form = ResetForm::default();
        self.auth_in_flight = None;
        self.reset_in_flight = None;
        let event = self.router.session_ended();
        self.emit(event);
        if was_authenticated {
            self.events.push(Event::SessionEnded);
        }
        cleared
    }

    /// Check the stored token with the service. A rejected token logs out.
    pub async fn verify_session(&mut self, api: &ApiClient) -> Result<VerifyOutcome, StorageError> {
        let Some(token) = self.session.current().map(|s| s.token().to_string()) else {
            return Ok(VerifyOutcome::NoSession);
        };
        match api.verify_token(&token).await {
            Ok(user) => Ok(VerifyOutcome::Valid(user)),
            Err(err) if err.is_unauthorized() => {
                info!("stored token rejected by service");
                self.logout()?;
                Ok(VerifyOutcome::Revoked)
            }
            Err(err) => {
                warn!(error = %err, "could not verify session");
                Ok(VerifyOutcome::Unreachable(err))
            }
        }
    }

    // ── Catalog and habits ───────────────────────────────────────────

    /// Replace the catalog with the remote list, or the fallback.
    pub async fn load_catalog(&mut self, api: &ApiClient) {
        self.catalog = catalog::load_catalog(api).await;
        self.events.push(Event::CatalogLoaded {
            count: self.catalog.len(),
            source: self.catalog.source(),
        });
    }

    /// Library button for catalog entry `id`.
    pub fn toggle_tracked(&mut self, id: RoutineId) {
        if !self.on_main_screen() {
            return;
        }
        let Some(entry) = self.catalog.get(id) else {
            debug!(id, "no catalog entry with this id");
            return;
        };
        let event = self.tracker.toggle_tracked(entry);
        self.emit(event);
    }

    pub fn add_habit(&mut self, id: RoutineId) {
        if !self.on_main_screen() {
            return;
        }
        if let Some(entry) = self.catalog.get(id) {
            let event = self.tracker.add(entry);
            self.emit(event);
        }
    }

    pub fn remove_habit(&mut self, id: RoutineId) {
        if !self.on_main_screen() {
            return;
        }
        let event = self.tracker.remove(id);
        self.emit(event);
    }

    pub fn toggle_complete(&mut self, id: RoutineId) {
        if !self.on_main_screen() {
            return;
        }
        let event = self.tracker.toggle_complete(id);
        self.emit(event);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn emit(&mut self, event: Option<Event>) {
        if let Some(event) = event {
            self.events.push(event);
        }
    }

    fn ticket(&mut self) -> Ticket {
        self.issued += 1;
        Ticket {
            epoch: self.router.epoch(),
            seq: self.issued,
        }
    }

    fn start_reset(&mut self) -> Ticket {
        let ticket = self.ticket();
        self.reset_form.error = None;
        self.reset_form.loading = true;
        self.reset_in_flight = Some(ticket);
        ticket
    }

    fn is_stale(&self, ticket: Ticket, what: &str) -> bool {
        let current = self.router.epoch();
        if ticket.epoch != current {
            debug!(what, issued = ticket.epoch, current, "ignoring stale response");
            return true;
        }
        false
    }

    fn reset_step_ready(&self, step: ResetStep) -> bool {
        self.screen() == Screen::PasswordReset
            && self.reset_form.step == step
            && !self.reset_form.loading
    }

    fn on_main_screen(&self) -> bool {
        matches!(self.screen(), Screen::Main { .. })
    }
}

/// Clear `slot` if it holds `ticket`. False means the form has moved on to
/// another request (or none) and its loading flag belongs to that one.
fn settle(slot: &mut Option<Ticket>, ticket: Ticket) -> bool {
    if *slot == Some(ticket) {
        *slot = None;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthField, ResetField};
    use crate::error::ValidationError;
    use crate::router::MOBILE_BREAKPOINT;
    use crate::session::{TOKEN_KEY, USER_KEY};
    use crate::storage::MemoryStore;

    fn logged_out() -> App<MemoryStore> {
        App::new(MemoryStore::new(), 390, MOBILE_BREAKPOINT)
    }

    fn session() -> Session {
        Session::new(
            User {
                id: 1,
                email: "a@b.com".into(),
                username: "A".into(),
            },
            "t1",
        )
    }

    fn logged_in() -> App<MemoryStore> {
        let mut app = logged_out();
        app.auth_form_mut().set(AuthField::Email, "a@b.com");
        app.auth_form_mut().set(AuthField::Password, "pw");
        let (ticket, _) = app.begin_auth().unwrap();
        app.finish_auth(ticket, Ok(session())).unwrap();
        app.drain_events();
        app
    }

    #[test]
    fn successful_login_persists_and_routes_to_library() {
        let mut app = logged_out();
        app.auth_form_mut().set(AuthField::Email, "a@b.com");
        app.auth_form_mut().set(AuthField::Password, "pw");

        let (ticket, request) = app.begin_auth().unwrap();
        assert_eq!(request.action(), "login");
        assert!(app.auth_form().loading);

        app.finish_auth(ticket, Ok(session())).unwrap();
        assert_eq!(app.screen(), Screen::Main { tab: Tab::Library });
        assert_eq!(app.session(), Some(&session()));
        assert_eq!(app.store().get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        assert!(app.store().contains(USER_KEY));
        assert!(!app.auth_form().loading);

        let events = app.drain_events();
        assert!(events.contains(&Event::SessionStarted { user_id: 1 }));
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn failed_login_shows_message_and_stays_put() {
        let mut app = logged_out();
        app.auth_form_mut().set(AuthField::Email, "a@b.com");
        app.auth_form_mut().set(AuthField::Password, "pw");
        let (ticket, _) = app.begin_auth().unwrap();
        app.finish_auth(
            ticket,
            Err(AuthError::RequestFailed {
                status: 401,
                message: "Invalid credentials".into(),
            }),
        )
        .unwrap();

        assert_eq!(app.screen(), Screen::Unauthenticated);
        assert_eq!(app.auth_form().error.as_deref(), Some("Invalid credentials"));
        assert!(app.store().is_empty());

        app.auth_form_mut().set(AuthField::Password, "pw2");
        assert!(app.auth_form().error.is_none());
    }

    #[test]
    fn empty_form_never_starts_request() {
        let mut app = logged_out();
        assert!(app.begin_auth().is_none());
        assert_eq!(app.auth_form().error.as_deref(), Some("Email is required"));
        assert!(!app.auth_form().loading);
    }

    #[test]
    fn second_submit_while_loading_is_refused() {
        let mut app = logged_out();
        app.auth_form_mut().set(AuthField::Email, "a@b.com");
        app.auth_form_mut().set(AuthField::Password, "pw");
        assert!(app.begin_auth().is_some());
        assert!(app.begin_auth().is_none());
    }

    #[test]
    fn login_response_after_leaving_screen_is_ignored() {
        let mut app = logged_out();
        app.auth_form_mut().set(AuthField::Email, "a@b.com");
        app.auth_form_mut().set(AuthField::Password, "pw");
        let (ticket, _) = app.begin_auth().unwrap();

        app.show_password_reset();
        app.finish_auth(ticket, Ok(session())).unwrap();

        assert_eq!(app.screen(), Screen::PasswordReset);
        assert!(!app.is_authenticated());
        assert!(app.store().is_empty());

        // Nothing newer was started, so the old answer still unlocks the form.
        app.back_to_login();
        assert!(!app.auth_form().loading);
        assert!(app.begin_auth().is_some());
    }

    #[test]
    fn abandoned_reset_request_cannot_unlock_newer_one() {
        let mut app = logged_out();
        app.show_password_reset();
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        let (old, _) = app.begin_reset_request().unwrap();

        app.back_to_login();
        app.show_password_reset();
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        let (new, _) = app.begin_reset_request().unwrap();

        app.finish_reset_request(
            old,
            Err(AuthError::RequestFailed {
                status: 500,
                message: "late".into(),
            }),
        );
        assert!(app.reset_form().loading);
        assert!(app.reset_form().error.is_none());
        assert!(app.begin_reset_request().is_none());

        app.finish_reset_request(new, Ok(ResetTicket { demo_code: None }));
        assert!(!app.reset_form().loading);
        assert_eq!(app.reset_form().step, ResetStep::Code);
    }

    #[test]
    fn answer_from_previous_reset_visit_is_dropped_when_idle() {
        let mut app = logged_out();
        app.show_password_reset();
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        let (old, _) = app.begin_reset_request().unwrap();
        app.back_to_login();
        app.show_password_reset();

        app.finish_reset_request(old, Ok(ResetTicket { demo_code: None }));
        assert_eq!(app.reset_form().step, ResetStep::Email);
        assert!(!app.reset_form().loading);
        assert!(app.drain_events().iter().all(|e| *e != Event::ResetCodeIssued));
    }

    #[test]
    fn new_reset_request_clears_previous_error() {
        let mut app = logged_out();
        app.show_password_reset();
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        let (ticket, _) = app.begin_reset_request().unwrap();
        app.finish_reset_request(
            ticket,
            Err(AuthError::RequestFailed {
                status: 404,
                message: "No account with that email".into(),
            }),
        );
        assert!(app.reset_form().error.is_some());

        // Retry without touching the field.
        assert!(app.begin_reset_request().is_some());
        assert!(app.reset_form().error.is_none());
        assert!(app.reset_form().loading);
    }

    #[test]
    fn reset_mismatch_blocks_request() {
        let mut app = logged_out();
        app.show_password_reset();
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        let (ticket, _) = app.begin_reset_request().unwrap();
        app.finish_reset_request(
            ticket,
            Ok(ResetTicket {
                demo_code: Some("123456".into()),
            }),
        );
        assert_eq!(app.reset_form().step, ResetStep::Code);
        assert_eq!(app.reset_form().demo_code.as_deref(), Some("123456"));

        app.reset_form_mut().set(ResetField::Code, "123456");
        app.reset_form_mut().set(ResetField::NewPassword, "abcdef");
        app.reset_form_mut().set(ResetField::ConfirmPassword, "abcdeg");
        assert!(app.begin_reset_confirm().is_none());
        assert_eq!(
            app.reset_form().error.as_deref(),
            Some(ValidationError::PasswordMismatch.to_string().as_str())
        );
        assert!(!app.reset_form().loading);
    }

    #[test]
    fn reset_confirm_success_returns_to_login() {
        let mut app = logged_out();
        app.show_password_reset();
        app.reset_form_mut().step = ResetStep::Code;
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        app.reset_form_mut().set(ResetField::Code, "123456");
        app.reset_form_mut().set(ResetField::NewPassword, "abcdef");
        app.reset_form_mut().set(ResetField::ConfirmPassword, "abcdef");

        let (ticket, _) = app.begin_reset_confirm().unwrap();
        app.finish_reset_confirm(ticket, Ok(()));

        assert_eq!(app.screen(), Screen::Unauthenticated);
        assert_eq!(app.reset_form().step, ResetStep::Email);
        assert!(app.drain_events().contains(&Event::PasswordChanged));
    }

    #[test]
    fn back_from_reset_clears_form() {
        let mut app = logged_out();
        app.show_password_reset();
        app.reset_form_mut().set(ResetField::Email, "a@b.com");
        app.back_to_login();
        assert_eq!(app.screen(), Screen::Unauthenticated);
        assert!(app.reset_form().email.is_empty());
    }

    #[test]
    fn habits_follow_catalog_and_survive_unsupported_device() {
        let mut app = logged_in();
        app.toggle_tracked(1);
        app.toggle_tracked(3);
        app.toggle_complete(3);
        app.select_tab(Tab::MyHabits);

        app.resize(1024);
        assert_eq!(app.screen(), Screen::UnsupportedDevice);
        app.toggle_complete(1);
        assert!(!app.tracker().get(1).unwrap().completed);

        app.resize(390);
        assert_eq!(app.screen(), Screen::Main { tab: Tab::MyHabits });
        assert_eq!(app.tracker().total_count(), 2);
        assert_eq!(app.tracker().get(3).unwrap().streak, 1);
    }

    #[test]
    fn unknown_catalog_id_is_ignored() {
        let mut app = logged_in();
        app.toggle_tracked(9999);
        assert!(app.tracker().is_empty());
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn logout_clears_everything() {
        let mut app = logged_in();
        app.add_habit(2);
        app.logout().unwrap();

        assert_eq!(app.screen(), Screen::Unauthenticated);
        assert!(app.session().is_none());
        assert!(app.store().is_empty());
        assert!(app.tracker().is_empty());
        assert!(app.drain_events().contains(&Event::SessionEnded));
    }

    #[test]
    fn hydrated_session_on_wide_viewport_is_unsupported() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "t1").unwrap();
        store
            .set(USER_KEY, r#"{"id":1,"email":"a@b.com","username":"A"}"#)
            .unwrap();
        let app = App::new(store, 1200, MOBILE_BREAKPOINT);
        assert_eq!(app.screen(), Screen::UnsupportedDevice);
        assert_eq!(app.session().unwrap().user().username, "A");
    }
}
