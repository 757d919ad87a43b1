//! In-memory record store — the same contract as `RestStore`, no network.
//! Used by the engine tests and by local dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;

use salespulse_core::error::{PulseError, Result};
use salespulse_core::traits::{Clause, Filter, RecordStore};

/// Tables of JSON rows behind a mutex. Inserted rows get a uuid `id` if the
/// caller didn't supply one, matching the hosted store's behavior.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload rows into a table.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.lock().unwrap();
        tables.get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(table).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter(|row| filter.clauses().iter().all(|c| clause_matches(row, c)))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables.entry(table.to_string()).or_default();
        for mut row in rows {
            if let Some(obj) = row.as_object_mut()
                && !obj.contains_key("id")
            {
                obj.insert(
                    "id".to_string(),
                    Value::String(uuid::Uuid::new_v4().to_string()),
                );
            }
            stored.push(row);
        }
        Ok(())
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| PulseError::Store(format!("No such table: {table}")))?;
        let row = rows
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| PulseError::Store(format!("No row {id} in {table}")))?;
        let (Some(obj), Some(patch_obj)) = (row.as_object_mut(), patch.as_object()) else {
            return Err(PulseError::Store("Patch must be a JSON object".into()));
        };
        for (key, value) in patch_obj {
            obj.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Structural evaluation of one clause against one row.
fn clause_matches(row: &Value, clause: &Clause) -> bool {
    match clause {
        Clause::Eq { column, value } => {
            scalar_string(row.get(column)).is_some_and(|s| s == *value)
        }
        Clause::Lte { column, value } => {
            let Some(actual) = scalar_string(row.get(column)) else {
                return false;
            };
            lte(&actual, value)
        }
        Clause::In { column, values } => {
            scalar_string(row.get(column)).is_some_and(|s| values.contains(&s))
        }
    }
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Timestamp-aware `<=`: RFC 3339 first, then numeric, then lexicographic.
fn lte(actual: &str, bound: &str) -> bool {
    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(actual),
        DateTime::parse_from_rfc3339(bound),
    ) {
        return a <= b;
    }
    if let (Ok(a), Ok(b)) = (actual.parse::<f64>(), bound.parse::<f64>()) {
        return a <= b;
    }
    actual <= bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_filters() {
        let store = MemoryStore::new();
        store.seed(
            "timers",
            vec![
                json!({"id": "a", "status": "active", "next_trigger": "2026-08-01T00:00:00+00:00"}),
                json!({"id": "b", "status": "completed", "next_trigger": "2026-08-01T00:00:00+00:00"}),
                json!({"id": "c", "status": "active", "next_trigger": "2026-09-01T00:00:00+00:00"}),
                json!({"id": "d", "status": "active", "next_trigger": null}),
            ],
        );

        let filter = Filter::new()
            .eq("status", "active")
            .lte("next_trigger", "2026-08-05T00:00:00+00:00");
        let rows = store.query("timers", &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_in_clause() {
        let store = MemoryStore::new();
        store.seed(
            "sales",
            vec![
                json!({"id": "u1", "email": "u1@crm.test"}),
                json!({"id": "u2", "email": "u2@crm.test"}),
                json!({"id": "u3", "email": "u3@crm.test"}),
            ],
        );
        let filter = Filter::new().any_of("id", vec!["u1".into(), "u3".into()]);
        let rows = store.query("sales", &filter).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = MemoryStore::new();
        store
            .insert("notifications", vec![json!({"user_id": "u1"})])
            .await
            .unwrap();
        let rows = store.rows("notifications");
        assert!(rows[0]["id"].is_string());
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = MemoryStore::new();
        store.seed(
            "timers",
            vec![json!({"id": "t1", "status": "active", "trigger_count": 0})],
        );
        store
            .update("timers", "t1", json!({"status": "completed", "trigger_count": 1}))
            .await
            .unwrap();
        let rows = store.rows("timers");
        assert_eq!(rows[0]["status"], "completed");
        assert_eq!(rows[0]["trigger_count"], 1);

        let missing = store.update("timers", "nope", json!({})).await;
        assert!(missing.is_err());
    }
}
