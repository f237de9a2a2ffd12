//! Data models for TodoBreeze

mod todo;
mod user;

pub use todo::{Todo, TodoId, TodoPatch, TodoSummary};
pub use user::{Account, UserId};
