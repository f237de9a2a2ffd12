//! Login / signup form state.
//!
//! One form backing both modes. Typed values survive a mode switch, so a
//! user who flips to signup and back does not retype their email. Server
//! failures land in the error banner and leave every input intact; editing
//! any field clears the stale banner.

use crate::error::{Error, Result};

const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields";
const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Which variant of the form is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// Input fields the form can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    ConfirmPassword,
}

/// Required fields per mode; the presentation derives its layout from this.
#[must_use]
pub const fn required_fields(mode: AuthMode) -> &'static [AuthField] {
    match mode {
        AuthMode::Login => &[AuthField::Email, AuthField::Password],
        AuthMode::Signup => &[
            AuthField::Email,
            AuthField::Password,
            AuthField::ConfirmPassword,
        ],
    }
}

/// Validated credentials, ready for the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Mutable state behind the login / signup screen.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    email: String,
    password: String,
    confirm_password: String,
    error: Option<String>,
}

impl AuthForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// The banner message currently showing, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current raw value of a field, exactly as typed.
    #[must_use]
    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
            AuthField::ConfirmPassword => &self.confirm_password,
        }
    }

    /// Switch between login and signup, keeping typed values.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
    }

    /// Record an edit. Whatever error was showing is stale once the user
    /// types again.
    pub fn set_field(&mut self, field: AuthField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AuthField::Email => self.email = value,
            AuthField::Password => self.password = value,
            AuthField::ConfirmPassword => self.confirm_password = value,
        }
        self.error = None;
    }

    /// Put a submission failure on the banner, inputs untouched.
    pub fn set_submit_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Dismiss the banner without touching inputs.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Validate the current mode's inputs.
    ///
    /// On failure the message lands on the banner and comes back as
    /// [`Error::Validation`]; no network call should follow. Credentials
    /// pass through exactly as typed.
    pub fn validate(&mut self) -> Result<Credentials> {
        let missing = required_fields(self.mode)
            .iter()
            .any(|field| self.value(*field).trim().is_empty());
        if missing {
            return self.fail(MSG_FILL_ALL_FIELDS);
        }
        if self.mode == AuthMode::Signup && self.password != self.confirm_password {
            return self.fail(MSG_PASSWORD_MISMATCH);
        }
        Ok(Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }

    fn fail(&mut self, message: &str) -> Result<Credentials> {
        self.error = Some(message.to_string());
        Err(Error::Validation(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled_signup_form(password: &str, confirm: &str) -> AuthForm {
        let mut form = AuthForm::new();
        form.set_mode(AuthMode::Signup);
        form.set_field(AuthField::Email, "a@b.com");
        form.set_field(AuthField::Password, password);
        form.set_field(AuthField::ConfirmPassword, confirm);
        form
    }

    #[test]
    fn login_requires_email_and_password_only() {
        assert_eq!(
            required_fields(AuthMode::Login),
            &[AuthField::Email, AuthField::Password]
        );
        assert_eq!(
            required_fields(AuthMode::Signup),
            &[
                AuthField::Email,
                AuthField::Password,
                AuthField::ConfirmPassword
            ]
        );
    }

    #[test]
    fn empty_fields_fail_with_the_banner_message() {
        let mut form = AuthForm::new();
        form.set_field(AuthField::Email, "a@b.com");

        let error = form.validate().unwrap_err();
        assert_eq!(error.to_string(), "Please fill in all fields");
        assert_eq!(form.error(), Some("Please fill in all fields"));
    }

    #[test]
    fn password_mismatch_fails_only_in_signup_mode() {
        let mut form = filled_signup_form("secret", "secondguess");
        let error = form.validate().unwrap_err();
        assert_eq!(error.to_string(), "Passwords do not match");
        assert_eq!(form.error(), Some("Passwords do not match"));

        // Login mode never looks at the confirm field.
        form.set_mode(AuthMode::Login);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn matching_signup_passwords_yield_credentials_as_typed() {
        let mut form = filled_signup_form("secret", "secret");
        let credentials = form.validate().unwrap();
        assert_eq!(credentials.email, "a@b.com");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn editing_a_field_clears_the_banner() {
        let mut form = AuthForm::new();
        let _ = form.validate();
        assert!(form.error().is_some());

        form.set_field(AuthField::Email, "a@b.com");
        assert_eq!(form.error(), None);
    }

    #[test]
    fn submit_errors_keep_the_typed_inputs() {
        let mut form = AuthForm::new();
        form.set_field(AuthField::Email, "a@b.com");
        form.set_field(AuthField::Password, "secret");

        form.set_submit_error("Authentication failed: Invalid credentials");
        assert_eq!(
            form.error(),
            Some("Authentication failed: Invalid credentials")
        );
        assert_eq!(form.value(AuthField::Email), "a@b.com");
        assert_eq!(form.value(AuthField::Password), "secret");

        form.dismiss_error();
        assert_eq!(form.error(), None);
        assert_eq!(form.value(AuthField::Email), "a@b.com");
    }

    #[test]
    fn mode_switch_keeps_values_and_drops_the_banner() {
        let mut form = AuthForm::new();
        form.set_field(AuthField::Email, "a@b.com");
        form.set_submit_error("Authentication failed: nope");

        form.set_mode(AuthMode::Signup);
        assert_eq!(form.error(), None);
        assert_eq!(form.value(AuthField::Email), "a@b.com");
    }
}
