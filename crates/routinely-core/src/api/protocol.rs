//! Request and response schemas for the external service.

use serde::{Deserialize, Serialize};

use crate::catalog::RoutineCatalogEntry;
use crate::session::{Session, User};

/// Body of a POST to the auth endpoint, discriminated by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        username: String,
    },
    ResetPassword {
        email: String,
    },
    ConfirmReset {
        email: String,
        reset_code: String,
        new_password: String,
    },
}

impl AuthRequest {
    pub fn action(&self) -> &'static str {
        match self {
            AuthRequest::Login { .. } => "login",
            AuthRequest::Register { .. } => "register",
            AuthRequest::ResetPassword { .. } => "reset_password",
            AuthRequest::ConfirmReset { .. } => "confirm_reset",
        }
    }
}

/// Successful login/register response. Extra fields such as `message` are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSuccess {
    pub token: String,
    pub user: User,
}

impl From<AuthSuccess> for Session {
    fn from(success: AuthSuccess) -> Self {
        Session::new(success.user, success.token)
    }
}

/// Phase-1 password reset response.
///
/// `demo_code` is a development preview of the emailed code. A production
/// service must not return it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResetTicket {
    #[serde(default)]
    pub demo_code: Option<String>,
}

/// Token verification response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub user: User,
}

/// Error body the service attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Catalog endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    pub habits: Vec<RoutineCatalogEntry>,
    #[serde(default)]
    pub total: Option<usize>,
}
