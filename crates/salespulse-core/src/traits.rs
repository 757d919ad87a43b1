//! Capability traits — the narrow seams between the engine and the world.
//!
//! The engine only ever talks to the record store and the outbound channel
//! through these traits, so tests swap in in-memory implementations without
//! touching the processing logic.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A single filter clause, matching the operators the hosted store exposes.
#[derive(Debug, Clone)]
pub enum Clause {
    Eq { column: String, value: String },
    Lte { column: String, value: String },
    In { column: String, values: Vec<String> },
}

/// A conjunction of clauses applied to a `query`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`
    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// `column <= value`
    pub fn lte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Lte {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// `column IN (values)`
    pub fn any_of(mut self, column: &str, values: Vec<String>) -> Self {
        self.clauses.push(Clause::In {
            column: column.to_string(),
            values,
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

/// Transactional record store: read-with-filter, insert, update-by-id.
/// The store is the source of truth; nothing is cached across runs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch all rows of `table` matching `filter`.
    async fn query(&self, table: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// Insert rows into `table` as one batch.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<()>;

    /// Patch the row of `table` with the given id, key by key.
    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<()>;
}

/// Outbound notification channel (e.g. SMTP email).
/// Callers decide whether a send failure matters; this trait just reports it.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver one message to one resolved address.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}
