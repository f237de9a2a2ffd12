//! Traits the embedding presentation layer implements.
//!
//! The core never draws anything. Navigation resets and blocking yes/no
//! confirmations are delegated to whichever host embeds it: a mobile shell
//! wires these to its navigator and alert dialogs, the CLI to stdout and
//! stdin.

/// Screens the navigation host can reset to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Login / signup form, the unauthenticated root.
    Login,
    /// Todo list, the protected root.
    Todos,
}

/// Minimal navigation surface: replace the whole stack with a single root.
///
/// Reset, not push. After crossing the auth boundary in either direction the
/// previous screen must be unreachable through back-navigation.
pub trait NavigationHost {
    fn reset_to(&self, route: Route);
}

/// Blocking yes/no prompt. Returns `true` when the user confirms.
pub trait ConfirmPrompt {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Dialog copy for a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

/// Prompt shown before a todo is deleted.
pub const DELETE_TODO_PROMPT: ConfirmRequest = ConfirmRequest {
    title: "Delete Task",
    message: "Are you sure you want to delete this task?",
    confirm_label: "Delete",
    cancel_label: "Cancel",
};

/// Prompt shown before the session is cleared.
pub const LOGOUT_PROMPT: ConfirmRequest = ConfirmRequest {
    title: "Logout",
    message: "Are you sure you want to logout?",
    confirm_label: "Logout",
    cancel_label: "Cancel",
};
