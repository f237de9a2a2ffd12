//! Authentication: form state and the session-driven routing gate.

mod form;
mod gate;

pub use form::{required_fields, AuthField, AuthForm, AuthMode, Credentials};
pub use gate::{AuthGate, AuthPhase, LogoutOutcome};
