//! Normalized client-side cache of todo query results.
//!
//! Two tables: an entity table keyed by todo id, and a query table mapping
//! each user to the ordered id references their last list response produced.
//! Entries are written only from server responses; the view layer re-runs
//! the list query after every mutation instead of patching results
//! speculatively. A JSON snapshot of both tables is persisted so a cold
//! start can render the last known-good list before the first refetch lands.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Todo, TodoId, TodoPatch, UserId};

/// Bumped when the snapshot layout changes; older snapshots are discarded,
/// never migrated, since the server can always repopulate the cache.
const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// In-memory normalized query cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCache {
    entities: HashMap<TodoId, Todo>,
    queries: HashMap<UserId, Vec<TodoId>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a user's list query result with a fresh server response.
    ///
    /// Each todo is stored once in the entity table regardless of how many
    /// times the response repeats it: the first occurrence keeps its list
    /// position, the last occurrence wins the field values. A materialized
    /// list therefore never shows the same id twice.
    pub fn store_todos(&mut self, user_id: &UserId, todos: &[Todo]) {
        let mut refs: Vec<TodoId> = Vec::with_capacity(todos.len());
        for todo in todos {
            if !refs.contains(&todo.id) {
                refs.push(todo.id.clone());
            }
            self.entities.insert(todo.id.clone(), todo.clone());
        }
        self.queries.insert(user_id.clone(), refs);
    }

    /// Merge a partial mutation response into an existing entity.
    ///
    /// Unknown ids are ignored: a patch alone cannot create an entity the
    /// server never listed.
    pub fn merge_patch(&mut self, patch: &TodoPatch) {
        if let Some(todo) = self.entities.get_mut(&patch.id) {
            todo.completed = patch.completed;
        }
    }

    /// Materialize the last known-good list for a user.
    ///
    /// `None` when the user's list query has never been cached. References
    /// whose entity has been dropped are skipped rather than invented.
    #[must_use]
    pub fn todos_for(&self, user_id: &UserId) -> Option<Vec<Todo>> {
        let refs = self.queries.get(user_id)?;
        Some(
            refs.iter()
                .filter_map(|id| self.entities.get(id).cloned())
                .collect(),
        )
    }

    /// Forget a user's cached list query, e.g. on logout.
    pub fn evict_user(&mut self, user_id: &UserId) {
        self.queries.remove(user_id);
    }

    /// Drop entities no stored query references. Returns how many were
    /// dropped.
    pub fn gc(&mut self) -> usize {
        let reachable: HashSet<TodoId> = self.queries.values().flatten().cloned().collect();
        let before = self.entities.len();
        self.entities.retain(|id, _| reachable.contains(id));
        before - self.entities.len()
    }

    /// Whether the cache holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.queries.is_empty()
    }

    // -----------------------------------------------------------------------
    // Snapshot persistence
    // -----------------------------------------------------------------------

    /// Load a snapshot from disk.
    ///
    /// Missing, unreadable, corrupt, or version-mismatched snapshots all
    /// yield a fresh cache: the snapshot is an optimization, so losing it
    /// costs one network round trip, never an error.
    #[must_use]
    pub fn load_snapshot(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != ErrorKind::NotFound {
                    tracing::warn!("failed to read cache snapshot, starting fresh: {error}");
                }
                return Self::new();
            }
        };
        let snapshot: Snapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!("corrupt cache snapshot, starting fresh: {error}");
                return Self::new();
            }
        };
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            tracing::warn!(
                found = snapshot.schema_version,
                expected = SNAPSHOT_SCHEMA_VERSION,
                "cache snapshot schema mismatch, starting fresh"
            );
            return Self::new();
        }
        Self {
            entities: snapshot.entities,
            queries: snapshot.queries,
        }
    }

    /// Persist the cache for instant cold-start rendering.
    ///
    /// Unreferenced entities are collected first so the snapshot never grows
    /// past what the stored queries can reach.
    pub fn save_snapshot(&mut self, path: &Path) -> Result<()> {
        let dropped = self.gc();
        if dropped > 0 {
            tracing::debug!(dropped, "collected unreferenced todos before snapshot");
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| Error::Storage(error.to_string()))?;
        }
        let snapshot = Snapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            persisted_at: chrono::Utc::now().timestamp_millis(),
            queries: self.queries.clone(),
            entities: self.entities.clone(),
        };
        let serialized = serde_json::to_string(&snapshot)?;
        fs::write(path, serialized).map_err(|error| Error::Storage(error.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    schema_version: u32,
    /// Unix ms; diagnostic only, snapshots do not expire.
    persisted_at: i64,
    queries: HashMap<UserId, Vec<TodoId>>,
    entities: HashMap<TodoId, Todo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn todo(id: &str, text: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::from(id),
            text: text.to_string(),
            completed,
        }
    }

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    #[test]
    fn uncached_user_materializes_to_none() {
        let cache = QueryCache::new();
        assert_eq!(cache.todos_for(&user("u-1")), None);
    }

    #[test]
    fn store_replaces_the_previous_list_wholesale() {
        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "a", false), todo("2", "b", false)]);
        cache.store_todos(&user("u-1"), &[todo("2", "b", true)]);
        assert_eq!(
            cache.todos_for(&user("u-1")),
            Some(vec![todo("2", "b", true)])
        );
    }

    #[test]
    fn duplicate_ids_in_one_response_collapse_to_one_row() {
        let mut cache = QueryCache::new();
        cache.store_todos(
            &user("u-1"),
            &[
                todo("1", "first copy", false),
                todo("2", "other", false),
                todo("1", "second copy", true),
            ],
        );
        // First occurrence keeps the position, last occurrence wins the fields.
        assert_eq!(
            cache.todos_for(&user("u-1")),
            Some(vec![todo("1", "second copy", true), todo("2", "other", false)])
        );
    }

    #[test]
    fn lists_are_scoped_per_user() {
        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "mine", false)]);
        cache.store_todos(&user("u-2"), &[todo("2", "theirs", false)]);
        assert_eq!(cache.todos_for(&user("u-1")), Some(vec![todo("1", "mine", false)]));
        assert_eq!(cache.todos_for(&user("u-2")), Some(vec![todo("2", "theirs", false)]));
    }

    #[test]
    fn merge_patch_updates_an_existing_entity() {
        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "a", false)]);
        cache.merge_patch(&TodoPatch {
            id: TodoId::from("1"),
            completed: true,
        });
        assert_eq!(cache.todos_for(&user("u-1")), Some(vec![todo("1", "a", true)]));
    }

    #[test]
    fn merge_patch_never_creates_an_entity() {
        let mut cache = QueryCache::new();
        cache.merge_patch(&TodoPatch {
            id: TodoId::from("ghost"),
            completed: true,
        });
        assert!(cache.is_empty());
    }

    #[test]
    fn gc_drops_only_unreferenced_entities() {
        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "a", false), todo("2", "b", false)]);
        // Shrinking the list orphans todo 2's entity.
        cache.store_todos(&user("u-1"), &[todo("1", "a", false)]);
        assert_eq!(cache.gc(), 1);
        assert_eq!(cache.todos_for(&user("u-1")), Some(vec![todo("1", "a", false)]));
        assert_eq!(cache.gc(), 0);
    }

    #[test]
    fn evict_user_forgets_the_query_but_gc_reclaims_entities() {
        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "a", false)]);
        cache.evict_user(&user("u-1"));
        assert_eq!(cache.todos_for(&user("u-1")), None);
        assert_eq!(cache.gc(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "a", true), todo("2", "b", false)]);
        cache.save_snapshot(&path).unwrap();

        let restored = QueryCache::load_snapshot(&path);
        assert_eq!(restored, cache);
    }

    #[test]
    fn missing_snapshot_loads_fresh() {
        let dir = tempdir().unwrap();
        let cache = QueryCache::load_snapshot(&dir.path().join("nope.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_snapshot_loads_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ definitely not a snapshot").unwrap();
        let cache = QueryCache::load_snapshot(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn snapshot_from_another_schema_version_loads_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(
            &path,
            r#"{"schema_version":999,"persisted_at":0,"queries":{},"entities":{}}"#,
        )
        .unwrap();
        let cache = QueryCache::load_snapshot(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn save_snapshot_collects_garbage_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = QueryCache::new();
        cache.store_todos(&user("u-1"), &[todo("1", "a", false), todo("2", "b", false)]);
        cache.store_todos(&user("u-1"), &[todo("1", "a", false)]);
        cache.save_snapshot(&path).unwrap();

        let restored = QueryCache::load_snapshot(&path);
        assert_eq!(restored.todos_for(&user("u-1")), Some(vec![todo("1", "a", false)]));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("\"2\""), "orphaned entity leaked into snapshot: {raw}");
    }
}
