use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

const PREFERENCES_KEY: &str = "preferences";
const RECENT_QUERIES_KEY: &str = "recent_queries";

/// Point-in-time copy of the session state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Inferred preference tokens, in first-seen order, no duplicates
    pub preferences: Vec<String>,
    /// Every refined query text, oldest first
    pub recent_queries: Vec<String>,
    /// Free-form keys written through `update`
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl SessionSnapshot {
    fn push_preference(&mut self, token: &str) -> bool {
        if self.preferences.iter().any(|p| p == token) {
            return false;
        }
        self.preferences.push(token.to_string());
        true
    }
}

/// Preference memory shared by every request for the lifetime of the process.
///
/// Preferences only grow, except through [`SessionMemory::clear_preferences`].
/// Each mutation holds the write lock for its whole read-modify-write.
#[derive(Debug, Default)]
pub struct SessionMemory {
    state: RwLock<SessionSnapshot>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    /// Current preference tokens
    pub async fn preferences(&self) -> Vec<String> {
        self.state.read().await.preferences.clone()
    }

    /// Appends tokens not already present; returns the ones actually added
    pub async fn append_preferences<I>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut state = self.state.write().await;
        let added: Vec<String> = tokens
            .into_iter()
            .filter(|t| state.push_preference(t.as_ref()))
            .map(|t| t.as_ref().to_string())
            .collect();

        if !added.is_empty() {
            tracing::debug!(added = ?added, total = state.preferences.len(), "Preferences grew");
        }
        added
    }

    pub async fn record_query(&self, text: &str) {
        self.state.write().await.recent_queries.push(text.to_string());
    }

    /// Applies a patch key by key.
    ///
    /// Sequence values receive the patch value as one new element; anything else
    /// is replaced. `preferences` and `recent_queries` only accept strings and
    /// `preferences` keeps its no-duplicates rule. The patch is validated before
    /// anything is written, so a rejected patch leaves the session untouched.
    pub async fn update(&self, patch: Map<String, Value>) -> AppResult<SessionSnapshot> {
        for (key, value) in &patch {
            if (key == PREFERENCES_KEY || key == RECENT_QUERIES_KEY) && !value.is_string() {
                return Err(AppError::InvalidInput(format!(
                    "'{}' entries must be strings",
                    key
                )));
            }
        }

        let mut state = self.state.write().await;
        for (key, value) in patch {
            if key == PREFERENCES_KEY {
                if let Value::String(token) = value {
                    state.push_preference(&token);
                }
            } else if key == RECENT_QUERIES_KEY {
                if let Value::String(text) = value {
                    state.recent_queries.push(text);
                }
            } else if let Some(Value::Array(items)) = state.extra.get_mut(&key) {
                items.push(value);
            } else {
                state.extra.insert(key, value);
            }
        }

        Ok(state.clone())
    }

    /// Operator reset; the only way preferences shrink
    pub async fn clear_preferences(&self) -> SessionSnapshot {
        let mut state = self.state.write().await;
        let cleared = state.preferences.len();
        state.preferences.clear();
        tracing::info!(cleared, "Session preferences cleared");
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let session = SessionMemory::new();
        let snapshot = session.get().await;
        assert!(snapshot.preferences.is_empty());
        assert!(snapshot.recent_queries.is_empty());
    }

    #[tokio::test]
    async fn test_append_preferences_skips_duplicates_and_keeps_order() {
        let session = SessionMemory::new();
        let added = session.append_preferences(["co-op", "short"]).await;
        assert_eq!(added, vec!["co-op", "short"]);

        let added = session.append_preferences(["short", "rpg", "rpg"]).await;
        assert_eq!(added, vec!["rpg"]);
        assert_eq!(session.preferences().await, vec!["co-op", "short", "rpg"]);
    }

    #[tokio::test]
    async fn test_update_appends_to_sequences() {
        let session = SessionMemory::new();
        session.append_preferences(["puzzle"]).await;

        let snapshot = session
            .update(patch(json!({
                "preferences": "horror",
                "recent_queries": "spooky stuff"
            })))
            .await
            .unwrap();

        assert_eq!(snapshot.preferences, vec!["puzzle", "horror"]);
        assert_eq!(snapshot.recent_queries, vec!["spooky stuff"]);
    }

    #[tokio::test]
    async fn test_update_keeps_preferences_a_set() {
        let session = SessionMemory::new();
        session.append_preferences(["puzzle"]).await;
        let snapshot = session
            .update(patch(json!({ "preferences": "puzzle" })))
            .await
            .unwrap();
        assert_eq!(snapshot.preferences, vec!["puzzle"]);
    }

    #[tokio::test]
    async fn test_update_extra_keys_replace_or_append() {
        let session = SessionMemory::new();
        session
            .update(patch(json!({ "mood": "chill", "platforms": ["linux"] })))
            .await
            .unwrap();

        let snapshot = session
            .update(patch(json!({ "mood": "hyped", "platforms": ["deck", "pc"] })))
            .await
            .unwrap();

        assert_eq!(snapshot.extra["mood"], json!("hyped"));
        // appended as a single element, not flattened
        assert_eq!(snapshot.extra["platforms"], json!(["linux", ["deck", "pc"]]));
    }

    #[tokio::test]
    async fn test_invalid_patch_changes_nothing() {
        let session = SessionMemory::new();
        let result = session
            .update(patch(json!({ "mood": "chill", "preferences": ["a", "b"] })))
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        let snapshot = session.get().await;
        assert!(snapshot.extra.is_empty());
        assert!(snapshot.preferences.is_empty());
    }

    #[tokio::test]
    async fn test_clear_preferences_keeps_history() {
        let session = SessionMemory::new();
        session.append_preferences(["rpg"]).await;
        session.record_query("long rpg").await;

        let snapshot = session.clear_preferences().await;
        assert!(snapshot.preferences.is_empty());
        assert_eq!(snapshot.recent_queries, vec!["long rpg"]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let session = Arc::new(SessionMemory::new());
        let mut tasks = Vec::new();
        for i in 0..32 {
            let session = session.clone();
            tasks.push(tokio::spawn(async move {
                session.append_preferences([format!("tag-{i}"), "shared".to_string()]).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let preferences = session.preferences().await;
        assert_eq!(preferences.len(), 33);
        assert_eq!(preferences.iter().filter(|p| *p == "shared").count(), 1);
    }
}
