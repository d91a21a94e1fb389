//! HTTP client for the auth/reset endpoint and the routine catalog.
//!
//! Every failure maps to a user-displayable [`AuthError`]. Nothing is
//! retried.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::protocol::{
    AuthRequest, AuthSuccess, CatalogResponse, ErrorBody, ResetTicket, VerifyResponse,
};
use crate::catalog::RoutineCatalogEntry;
use crate::error::{
    AuthError, CatalogError, ConfigError, GENERIC_FAILURE_MESSAGE, MALFORMED_RESPONSE_MESSAGE,
};
use crate::session::{Session, User};
use crate::storage::ApiConfig;

/// Client for the external service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    auth_url: Url,
    catalog_url: Option<Url>,
    http_client: Client,
}

impl ApiClient {
    /// Create a client with default HTTP settings.
    pub fn new(auth_url: Url, catalog_url: Option<Url>) -> Self {
        Self {
            auth_url,
            catalog_url,
            http_client: Client::new(),
        }
    }

    /// Create a client from configuration, validating endpoint URLs.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "api.timeout_secs".into(),
                message: e.to_string(),
            })?;
        Ok(Self {
            auth_url: config.auth_endpoint()?,
            catalog_url: config.catalog_endpoint()?,
            http_client,
        })
    }

    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    pub fn catalog_url(&self) -> Option<&Url> {
        self.catalog_url.as_ref()
    }

    /// Sign in or sign up. Only `Login` and `Register` requests yield a
    /// session; other actions are rejected as a failed request.
    pub async fn authenticate(&self, request: &AuthRequest) -> Result<Session, AuthError> {
        if !matches!(request, AuthRequest::Login { .. } | AuthRequest::Register { .. }) {
            return Err(AuthError::RequestFailed {
                status: 0,
                message: format!("'{}' does not start a session", request.action()),
            });
        }
        let (status, body) = self.post(request).await?;
        let success: AuthSuccess = decode(status, &body)?;
        Ok(success.into())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.authenticate(&AuthRequest::Login {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Session, AuthError> {
        self.authenticate(&AuthRequest::Register {
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        })
        .await
    }

    /// Phase 1 of password reset.
    pub async fn request_password_reset(&self, email: &str) -> Result<ResetTicket, AuthError> {
        let request = AuthRequest::ResetPassword {
            email: email.to_string(),
        };
        let (status, body) = self.post(&request).await?;
        decode(status, &body)
    }

    /// Phase 2 of password reset. The success body is ignored.
    pub async fn confirm_password_reset(
        &self,
        email: &str,
        reset_code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let request = AuthRequest::ConfirmReset {
            email: email.to_string(),
            reset_code: reset_code.to_string(),
            new_password: new_password.to_string(),
        };
        self.post(&request).await?;
        Ok(())
    }

    /// Resolve the user a bearer token belongs to.
    pub async fn verify_token(&self, token: &str) -> Result<User, AuthError> {
        let resp = self
            .http_client
            .get(self.auth_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(AuthError::NetworkUnavailable)?;
        let (status, body) = read_body(resp).await?;
        let verified: VerifyResponse = decode(status, &body)?;
        Ok(verified.user)
    }

    /// Fetch the routine catalog, order preserved.
    pub async fn fetch_catalog(&self) -> Result<Vec<RoutineCatalogEntry>, CatalogError> {
        let url = self.catalog_url.as_ref().ok_or(CatalogError::NotConfigured)?;
        let resp = self.http_client.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let parsed: CatalogResponse = serde_json::from_str(&body)?;
        if let Some(total) = parsed.total.filter(|t| *t != parsed.habits.len()) {
            debug!(total, received = parsed.habits.len(), "catalog total disagrees with list");
        }
        Ok(parsed.habits)
    }

    async fn post(&self, request: &AuthRequest) -> Result<(u16, String), AuthError> {
        debug!(action = request.action(), "auth request");
        let resp = self
            .http_client
            .post(self.auth_url.clone())
            .json(request)
            .send()
            .await
            .map_err(AuthError::NetworkUnavailable)?;
        read_body(resp).await
    }
}

/// Return the body of a 2xx response, or the server's error message.
async fn read_body(resp: Response) -> Result<(u16, String), AuthError> {
    let status = resp.status();
    let body = resp.text().await.map_err(AuthError::NetworkUnavailable)?;

    if status.is_success() {
        return Ok((status.as_u16(), body));
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());

    Err(AuthError::RequestFailed {
        status: status.as_u16(),
        message,
    })
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AuthError> {
    serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "malformed response body");
        AuthError::RequestFailed {
            status,
            message: MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    })
}
