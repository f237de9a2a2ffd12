//! Refetch-driven view model for the todo list screen.
//!
//! Mutations never patch the visible list in place. Every successful add,
//! toggle, or delete re-runs the full list query and the screen re-renders
//! from the response, so after the round trip the list always shows server
//! truth. The cost is one extra request per mutation; the benefit is that
//! the list cannot drift from the server, which is the chosen trade-off.
//! Refetches are tracked with a sequence ticket so a slow response from a
//! superseded refetch can never overwrite a newer one.

use crate::api::TodoApi;
use crate::cache::QueryCache;
use crate::error::{Error, Result};
use crate::host::{ConfirmPrompt, DELETE_TODO_PROMPT};
use crate::models::{Todo, TodoId, TodoPatch, TodoSummary, UserId};

/// Lifecycle of the list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListPhase {
    /// No session attached and nothing cached; the query is skipped, not
    /// failed.
    #[default]
    Idle,
    /// A refetch is in flight.
    Loading,
    /// The last refetch succeeded; this is the list to render.
    Ready(Vec<Todo>),
    /// The last refetch failed; the cached list stays visible underneath
    /// the error banner.
    Failed(String),
}

/// Outcome of a delete routed through the confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Pairs an in-flight refetch with the generation that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
}

/// View model for the todo list screen.
///
/// All mutation paths take `&mut self`, so a host holding one model cannot
/// start a second mutation while one is pending; the borrow checker plays
/// the role of the disabled submit button.
pub struct TodoListModel {
    api: TodoApi,
    cache: QueryCache,
    user_id: Option<UserId>,
    phase: ListPhase,
    seq: u64,
}

impl TodoListModel {
    #[must_use]
    pub fn new(api: TodoApi, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            user_id: None,
            phase: ListPhase::Idle,
            seq: 0,
        }
    }

    /// Attach the signed-in user and seed the view from the cache so a cold
    /// start renders the last known-good list before the first refetch.
    pub fn attach_user(&mut self, user_id: UserId) {
        self.phase = match self.cache.todos_for(&user_id) {
            Some(cached) => ListPhase::Ready(cached),
            None => ListPhase::Idle,
        };
        self.user_id = Some(user_id);
    }

    /// Drop the session scope and return the view to idle.
    pub fn detach_user(&mut self) {
        self.user_id = None;
        self.phase = ListPhase::Idle;
    }

    #[must_use]
    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Mutable cache access for the host's persistence hooks (snapshot
    /// save, logout eviction).
    pub fn cache_mut(&mut self) -> &mut QueryCache {
        &mut self.cache
    }

    /// The rows the screen should draw right now: the `Ready` list, or the
    /// last known-good cached list while loading or after a failure.
    #[must_use]
    pub fn visible_todos(&self) -> Vec<Todo> {
        if let ListPhase::Ready(todos) = &self.phase {
            return todos.clone();
        }
        self.user_id
            .as_ref()
            .and_then(|user_id| self.cache.todos_for(user_id))
            .unwrap_or_default()
    }

    /// Derived counters, recomputed from the visible rows on every call.
    #[must_use]
    pub fn summary(&self) -> TodoSummary {
        TodoSummary::of(&self.visible_todos())
    }

    /// Start a refetch generation.
    ///
    /// `None` while no user is attached: an unscoped todos query would be
    /// meaningless, so it is never issued. Callers run the query for the
    /// returned scope and feed the outcome to [`Self::apply_refresh`].
    pub fn begin_refresh(&mut self) -> Option<(RefreshTicket, UserId)> {
        let user_id = self.user_id.clone()?;
        self.seq += 1;
        self.phase = ListPhase::Loading;
        Some((RefreshTicket { seq: self.seq }, user_id))
    }

    /// Apply a finished refetch.
    ///
    /// An outcome from a superseded generation is discarded wholesale, which
    /// makes overlapping refetches last-write-wins in completion order.
    /// Returns whether the outcome was applied.
    pub fn apply_refresh(&mut self, ticket: RefreshTicket, outcome: Result<Vec<Todo>>) -> bool {
        if ticket.seq != self.seq {
            tracing::debug!(
                stale = ticket.seq,
                current = self.seq,
                "discarding stale todos response"
            );
            return false;
        }
        match outcome {
            Ok(todos) => {
                if let Some(user_id) = &self.user_id {
                    self.cache.store_todos(user_id, &todos);
                }
                self.phase = ListPhase::Ready(todos);
            }
            Err(error) => {
                tracing::warn!("todos refetch failed: {error}");
                self.phase = ListPhase::Failed(error.to_string());
            }
        }
        true
    }

    /// Run one full refetch cycle against the service.
    pub async fn refresh(&mut self) {
        let Some((ticket, user_id)) = self.begin_refresh() else {
            tracing::debug!("todos query skipped: no session attached");
            return;
        };
        let outcome = self.api.todos(&user_id).await;
        self.apply_refresh(ticket, outcome);
    }

    /// Create a todo from the draft text, then refetch.
    ///
    /// An error here means the mutation itself failed and the list was left
    /// untouched; a refetch failure after a successful mutation shows up as
    /// [`ListPhase::Failed`] instead.
    pub async fn add(&mut self, text: &str) -> Result<Todo> {
        let user_id = self.require_user()?;
        let created = self.api.add_todo(&user_id, text).await?;
        self.refresh().await;
        Ok(created)
    }

    /// Flip a todo's completion flag, then refetch.
    pub async fn toggle(&mut self, id: &TodoId) -> Result<TodoPatch> {
        self.require_user()?;
        let patch = self.api.toggle_todo(id).await?;
        // The partial response merges into the cache immediately; the
        // refetch right behind it re-reads the full list anyway.
        self.cache.merge_patch(&patch);
        self.refresh().await;
        Ok(patch)
    }

    /// Delete a todo behind the confirmation prompt, then refetch.
    ///
    /// Declining the prompt is a successful `Cancelled` outcome, not an
    /// error. A server answer of `false` means nothing was deleted, so no
    /// refetch is issued and the failure surfaces like any other.
    pub async fn delete(
        &mut self,
        id: &TodoId,
        prompt: &impl ConfirmPrompt,
    ) -> Result<DeleteOutcome> {
        self.require_user()?;
        if !prompt.confirm(&DELETE_TODO_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }
        let deleted = self.api.delete_todo(id).await?;
        if !deleted {
            return Err(Error::Server("todo was not deleted".to_string()));
        }
        self.refresh().await;
        Ok(DeleteOutcome::Deleted)
    }

    fn require_user(&self) -> Result<UserId> {
        self.user_id.clone().ok_or(Error::NoSession)
    }
}
