//! breeze-core - Core library for TodoBreeze
//!
//! This crate contains the session model, query cache, GraphQL client, and
//! screen state machines shared by all TodoBreeze frontends. Frontends stay
//! thin: they implement the `host` traits and drive these types.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod list;
pub mod models;
pub mod session;

pub use error::{Error, Result};
pub use models::{Account, Todo, TodoId, TodoPatch, TodoSummary, UserId};
