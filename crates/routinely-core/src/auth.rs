//! Form state for signing in, signing up and resetting a password.
//!
//! Forms own their transient input, a loading flag and at most one inline
//! error. Editing any field dismisses the error. Validation here runs
//! before a request is built; a form that fails validation never reaches
//! the network.

use serde::{Deserialize, Serialize};

use crate::api::AuthRequest;
use crate::error::ValidationError;

/// Shortest password accepted for registration and reset.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    Username,
}

/// Combined login/registration form.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub username: String,
    pub error: Option<String>,
    pub loading: bool,
}

impl AuthForm {
    pub fn set(&mut self, field: AuthField, value: &str) {
        let slot = match field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Username => &mut self.username,
        };
        *slot = value.to_string();
        self.error = None;
    }

    /// Switch between login and registration, starting from a blank form.
    pub fn toggle_mode(&mut self) {
        let mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        *self = Self {
            mode,
            ..Self::default()
        };
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Build the request for the current mode.
    pub fn to_request(&self) -> Result<AuthRequest, ValidationError> {
        require(&self.email, "Email")?;
        require(&self.password, "Password")?;
        match self.mode {
            AuthMode::Login => Ok(AuthRequest::Login {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            }),
            AuthMode::Register => {
                require(&self.username, "Username")?;
                check_length(&self.password)?;
                Ok(AuthRequest::Register {
                    email: self.email.trim().to_string(),
                    password: self.password.clone(),
                    username: self.username.trim().to_string(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetStep {
    /// Asking for the account email.
    #[default]
    Email,
    /// Asking for the code and the new password.
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetField {
    Email,
    Code,
    NewPassword,
    ConfirmPassword,
}

/// Two-step password reset form.
#[derive(Debug, Clone, Default)]
pub struct ResetForm {
    pub step: ResetStep,
    pub email: String,
    pub reset_code: String,
    pub new_password: String,
    pub confirm_password: String,
    /// Preview code echoed by the service. Development only.
    pub demo_code: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
}

impl ResetForm {
    pub fn set(&mut self, field: ResetField, value: &str) {
        let slot = match field {
            ResetField::Email => &mut self.email,
            ResetField::Code => &mut self.reset_code,
            ResetField::NewPassword => &mut self.new_password,
            ResetField::ConfirmPassword => &mut self.confirm_password,
        };
        *slot = value.to_string();
        self.error = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Phase 1 request.
    pub fn to_code_request(&self) -> Result<AuthRequest, ValidationError> {
        require(&self.email, "Email")?;
        Ok(AuthRequest::ResetPassword {
            email: self.email.trim().to_string(),
        })
    }

    /// Phase 2 request. Password checks come first, in the order the user
    /// sees them: mismatch, then length.
    pub fn to_confirm_request(&self) -> Result<AuthRequest, ValidationError> {
        validate_new_password(&self.new_password, &self.confirm_password)?;
        require(&self.email, "Email")?;
        require(&self.reset_code, "Reset code")?;
        Ok(AuthRequest::ConfirmReset {
            email: self.email.trim().to_string(),
            reset_code: self.reset_code.trim().to_string(),
            new_password: self.new_password.clone(),
        })
    }
}

/// Local checks for a new password and its confirmation.
pub fn validate_new_password(new_password: &str, confirm: &str) -> Result<(), ValidationError> {
    if new_password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    check_length(new_password)
}

fn check_length(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_trims_email_only() {
        let mut form = AuthForm::default();
        form.set(AuthField::Email, "  a@b.com ");
        form.set(AuthField::Password, " pw ");
        assert_eq!(
            form.to_request().unwrap(),
            AuthRequest::Login {
                email: "a@b.com".into(),
                password: " pw ".into(),
            }
        );
    }

    #[test]
    fn login_requires_email_and_password() {
        let mut form = AuthForm::default();
        assert_eq!(
            form.to_request(),
            Err(ValidationError::MissingField { field: "Email" })
        );
        form.set(AuthField::Email, "a@b.com");
        assert_eq!(
            form.to_request(),
            Err(ValidationError::MissingField { field: "Password" })
        );
    }

    #[test]
    fn short_password_allowed_for_login_but_not_register() {
        let mut form = AuthForm::default();
        form.set(AuthField::Email, "a@b.com");
        form.set(AuthField::Password, "123");
        assert!(form.to_request().is_ok());

        form.toggle_mode();
        form.set(AuthField::Email, "a@b.com");
        form.set(AuthField::Password, "123");
        form.set(AuthField::Username, "A");
        assert_eq!(
            form.to_request(),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
    }

    #[test]
    fn register_requires_username() {
        let mut form = AuthForm {
            mode: AuthMode::Register,
            ..AuthForm::default()
        };
        form.set(AuthField::Email, "a@b.com");
        form.set(AuthField::Password, "secret1");
        assert_eq!(
            form.to_request(),
            Err(ValidationError::MissingField { field: "Username" })
        );
    }

    #[test]
    fn toggle_mode_clears_everything() {
        let mut form = AuthForm::default();
        form.set(AuthField::Email, "a@b.com");
        form.error = Some("boom".into());
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Register);
        assert!(form.email.is_empty());
        assert!(form.error.is_none());
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Login);
    }

    #[test]
    fn editing_clears_error() {
        let mut form = ResetForm {
            error: Some("Passwords do not match".into()),
            ..ResetForm::default()
        };
        form.set(ResetField::ConfirmPassword, "x");
        assert!(form.error.is_none());
    }

    #[test]
    fn mismatch_reported_before_length() {
        assert_eq!(
            validate_new_password("abc", "abd"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_new_password("abc", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(validate_new_password("abcdef", "abcdef"), Ok(()));
    }

    #[test]
    fn confirm_request_carries_code() {
        let mut form = ResetForm::default();
        form.set(ResetField::Email, "a@b.com");
        form.set(ResetField::Code, " 123456 ");
        form.set(ResetField::NewPassword, "newpass");
        form.set(ResetField::ConfirmPassword, "newpass");
        assert_eq!(
            form.to_confirm_request().unwrap(),
            AuthRequest::ConfirmReset {
                email: "a@b.com".into(),
                reset_code: "123456".into(),
                new_password: "newpass".into(),
            }
        );
    }
}
