//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use salespulse_engine::{RunSummary, run_due_timers};

use super::server::AppState;

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salespulse-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Run one batch of due timers. A partial-failure run is still a 200 — the
/// batch itself completed; 500 is reserved for the fatal fetch failure.
pub async fn process_timers(State(state): State<Arc<AppState>>) -> Response {
    match run_due_timers(state.store.clone(), state.sink.clone()).await {
        Ok(summary) => (StatusCode::OK, Json(summary_body(&summary))).into_response(),
        Err(e) => {
            tracing::error!("❌ Timer run aborted: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

fn summary_body(summary: &RunSummary) -> Value {
    if summary.is_empty() {
        json!({"message": "No timers to process"})
    } else {
        json!({
            "message": "Timer processing complete",
            "total": summary.total,
            "successful": summary.successful,
            "failed": summary.failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use salespulse_channels::EmailSink;
    use salespulse_core::config::SmtpConfig;
    use salespulse_core::traits::{Filter, RecordStore};
    use salespulse_core::types::TIMERS_TABLE;
    use salespulse_core::{PulseError, Result};
    use salespulse_store::MemoryStore;

    /// Store whose every query fails.
    struct DownStore;

    #[async_trait]
    impl RecordStore for DownStore {
        async fn query(&self, _table: &str, _filter: &Filter) -> Result<Vec<Value>> {
            Err(PulseError::Store("503 Service Unavailable".into()))
        }
        async fn insert(&self, _table: &str, _rows: Vec<Value>) -> Result<()> {
            Ok(())
        }
        async fn update(&self, _table: &str, _id: &str, _patch: Value) -> Result<()> {
            Ok(())
        }
    }

    fn test_state(store: Arc<dyn RecordStore>) -> State<Arc<AppState>> {
        let disabled = SmtpConfig {
            enabled: false,
            ..SmtpConfig::default()
        };
        State(Arc::new(AppState {
            store,
            sink: Arc::new(EmailSink::new(disabled)),
            start_time: std::time::Instant::now(),
        }))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let json = health_check(test_state(Arc::new(MemoryStore::new()))).await.0;
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert!(json["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn test_process_empty_queue() {
        let response = process_timers(test_state(Arc::new(MemoryStore::new()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json, json!({"message": "No timers to process"}));
    }

    #[tokio::test]
    async fn test_process_returns_summary() {
        let store = Arc::new(MemoryStore::new());
        store.seed(
            TIMERS_TABLE,
            vec![json!({
                "id": "t1",
                "entity_type": "lead",
                "entity_id": "l1",
                "priority": "high",
                "action_required": "Call the client",
                "assigned_to": "u1",
                "channels": ["in_app"],
                "status": "active",
                "recurrence_enabled": false,
                "next_trigger": (Utc::now() - chrono::Duration::hours(1)).to_rfc3339(),
            })],
        );

        let response = process_timers(test_state(store)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Timer processing complete");
        assert_eq!(json["total"], 1);
        assert_eq!(json["successful"], 1);
        assert_eq!(json["failed"], 0);
    }

    #[tokio::test]
    async fn test_fatal_fetch_is_500() {
        let response = process_timers(test_state(Arc::new(DownStore))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[test]
    fn test_empty_summary_body() {
        let body = summary_body(&RunSummary::default());
        assert_eq!(body, json!({"message": "No timers to process"}));
    }

    #[test]
    fn test_partial_failure_summary_body() {
        let summary = RunSummary {
            total: 3,
            successful: 2,
            failed: 1,
        };
        let body = summary_body(&summary);
        assert_eq!(body["total"], 3);
        assert_eq!(body["successful"], 2);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["message"], "Timer processing complete");
    }
}
