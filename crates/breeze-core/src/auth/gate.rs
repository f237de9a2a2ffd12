//! Session-driven routing gate.
//!
//! The gate owns the durable session slot and decides which root the
//! navigation host shows. The todo screen is only reachable while a session
//! id is stored, and leaving it always goes through the logout
//! confirmation, hardware back button included.

use crate::api::TodoApi;
use crate::auth::form::AuthForm;
use crate::error::Result;
use crate::host::{ConfirmPrompt, NavigationHost, Route, LOGOUT_PROMPT};
use crate::models::{Account, UserId};
use crate::session::SessionStore;

/// Authentication state as the gate knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthPhase {
    /// The session slot has not been checked yet (process just started).
    #[default]
    Unknown,
    Unauthenticated,
    Authenticated(UserId),
}

/// Outcome of the logout confirmation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    Cancelled,
}

/// Routing gate over the durable session slot.
pub struct AuthGate<S: SessionStore> {
    store: S,
    phase: AuthPhase,
}

impl<S: SessionStore> AuthGate<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            phase: AuthPhase::Unknown,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    /// The signed-in user, when there is one.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match &self.phase {
            AuthPhase::Authenticated(user_id) => Some(user_id),
            _ => None,
        }
    }

    /// Check the session slot and route, on app start and on screen focus.
    ///
    /// A storage failure routes to login exactly like an absent session; the
    /// difference only shows up in the log. Getting locked out of the login
    /// screen by a broken disk would be strictly worse.
    pub fn resolve(&mut self, nav: &impl NavigationHost) -> &AuthPhase {
        match self.store.load() {
            Ok(Some(user_id)) => {
                self.phase = AuthPhase::Authenticated(user_id);
                nav.reset_to(Route::Todos);
            }
            Ok(None) => {
                self.phase = AuthPhase::Unauthenticated;
                nav.reset_to(Route::Login);
            }
            Err(error) => {
                tracing::warn!("session load failed, treating as signed out: {error}");
                self.phase = AuthPhase::Unauthenticated;
                nav.reset_to(Route::Login);
            }
        }
        &self.phase
    }

    /// Submit the form in login mode: validate, call the service, persist
    /// the returned id, and reset navigation onto the todo root.
    ///
    /// Any failure past validation lands on the form's banner as well as in
    /// the returned error, and the gate stays signed out.
    pub async fn login(
        &mut self,
        api: &TodoApi,
        form: &mut AuthForm,
        nav: &impl NavigationHost,
    ) -> Result<Account> {
        let credentials = form.validate()?;
        let result = match api.login(&credentials.email, &credentials.password).await {
            Ok(account) => self.complete_sign_in(account, nav),
            Err(error) => Err(error),
        };
        if let Err(error) = &result {
            form.set_submit_error(error.to_string());
        }
        result
    }

    /// Submit the form in signup mode. A successful signup signs the new
    /// account straight in; there is no separate confirmation step.
    pub async fn signup(
        &mut self,
        api: &TodoApi,
        form: &mut AuthForm,
        nav: &impl NavigationHost,
    ) -> Result<Account> {
        let credentials = form.validate()?;
        let result = match api.signup(&credentials.email, &credentials.password).await {
            Ok(account) => self.complete_sign_in(account, nav),
            Err(error) => Err(error),
        };
        if let Err(error) = &result {
            form.set_submit_error(error.to_string());
        }
        result
    }

    /// Run the logout confirmation flow.
    ///
    /// Declining leaves everything untouched. Confirming clears the slot
    /// and resets navigation to the login root. A failed clear is logged
    /// and the user is still signed out locally rather than left trapped
    /// behind the gate; the stale slot gets another chance on the next
    /// logout.
    pub fn logout(
        &mut self,
        prompt: &impl ConfirmPrompt,
        nav: &impl NavigationHost,
    ) -> LogoutOutcome {
        if !prompt.confirm(&LOGOUT_PROMPT) {
            return LogoutOutcome::Cancelled;
        }
        if let Err(error) = self.store.clear() {
            tracing::error!("failed to clear stored session: {error}");
        }
        self.phase = AuthPhase::Unauthenticated;
        nav.reset_to(Route::Login);
        LogoutOutcome::LoggedOut
    }

    /// Hardware back press on the todo root: always consumed, redirected
    /// into the logout flow so back can never sidestep the confirmation.
    pub fn handle_back(
        &mut self,
        prompt: &impl ConfirmPrompt,
        nav: &impl NavigationHost,
    ) -> bool {
        self.logout(prompt, nav);
        true
    }

    fn complete_sign_in(&mut self, account: Account, nav: &impl NavigationHost) -> Result<Account> {
        self.store.save(&account.id)?;
        self.phase = AuthPhase::Authenticated(account.id.clone());
        nav.reset_to(Route::Todos);
        Ok(account)
    }
}
