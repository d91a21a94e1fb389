use tracing::{info, warn};

use super::{Session, User};
use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "authToken";
/// Storage key for the JSON-serialized [`User`].
pub const USER_KEY: &str = "user";

/// In-memory session mirrored to a [`KeyValueStore`].
///
/// Both keys are written on login and removed on logout. On startup a
/// session exists only when both keys are present and the user record
/// parses; anything else counts as logged out.
pub struct SessionStore<S: KeyValueStore> {
    backend: S,
    current: Option<Session>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Load the persisted session, if any.
    pub fn hydrate(backend: S) -> Self {
        let current = read_session(&backend);
        Self { backend, current }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Persist `session` and make it current.
    ///
    /// # Errors
    /// Returns an error if either key cannot be written. A partially
    /// written session is rolled back so the keys never disagree.
    pub fn establish(&mut self, session: Session) -> Result<(), StorageError> {
        let user_json =
            serde_json::to_string(session.user()).map_err(|e| StorageError::Encode {
                key: USER_KEY.to_string(),
                message: e.to_string(),
            })?;

        self.backend.set(TOKEN_KEY, session.token())?;
        if let Err(err) = self.backend.set(USER_KEY, &user_json) {
            let _ = self.backend.remove(TOKEN_KEY);
            return Err(err);
        }

        info!(user_id = session.user().id, "session established");
        self.current = Some(session);
        Ok(())
    }

    /// Forget the session in memory and in storage.
    ///
    /// The in-memory session is always dropped, and removal of both keys is
    /// always attempted, even if the first removal fails.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        if let Some(session) = self.current.take() {
            info!(user_id = session.user().id, "session cleared");
        }
        let token = self.backend.remove(TOKEN_KEY);
        let user = self.backend.remove(USER_KEY);
        token?;
        user?;
        Ok(())
    }
}

fn read_session<S: KeyValueStore>(backend: &S) -> Option<Session> {
    let token = match backend.get(TOKEN_KEY) {
        Ok(Some(token)) if !token.is_empty() => token,
        Ok(_) => return None,
        Err(err) => {
            warn!(error = %err, "failed to read stored token");
            return None;
        }
    };

    let user_json = match backend.get(USER_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => {
            warn!("stored token has no matching user record, ignoring it");
            return None;
        }
        Err(err) => {
            warn!(error = %err, "failed to read stored user");
            return None;
        }
    };

    match serde_json::from_str::<User>(&user_json) {
        Ok(user) => Some(Session::new(user, token)),
        Err(err) => {
            warn!(error = %err, "stored user record is malformed, ignoring it");
            None
        }
    }
}
