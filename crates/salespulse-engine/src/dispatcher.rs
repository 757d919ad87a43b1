//! Batch dispatcher — one invocation per external trigger.
//!
//! Fetches every due timer, processes them concurrently with failures
//! isolated per timer, and reports an aggregate summary. Only the initial
//! fetch is fatal; everything after it settles to a per-timer result.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;

use salespulse_core::traits::{Filter, NotificationSink, RecordStore};
use salespulse_core::types::{TIMERS_TABLE, Timer};
use salespulse_core::{PulseError, Result};

use crate::processor::TimerProcessor;

/// Aggregate outcome of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl RunSummary {
    /// True when no timer was due this run.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Process every timer that is due right now.
///
/// Err means the due-timer fetch itself failed and nothing was touched;
/// per-timer failures only show up in the summary counts.
pub async fn run_due_timers(
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn NotificationSink>,
) -> Result<RunSummary> {
    let now = Utc::now();
    let filter = Filter::new()
        .eq("status", "active")
        .lte("next_trigger", now.to_rfc3339());
    let rows = store.query(TIMERS_TABLE, &filter).await?;

    if rows.is_empty() {
        tracing::info!("No due timers");
        return Ok(RunSummary::default());
    }

    let total = rows.len();
    tracing::info!("⏰ Processing {} due timer(s)", total);

    let processor = TimerProcessor::new(store, sink);
    let runs = rows.into_iter().map(|row| {
        let processor = &processor;
        async move {
            let timer: Timer = serde_json::from_value(row).map_err(|e| {
                tracing::warn!("⚠️ Skipping malformed timer row: {e}");
                PulseError::Store(format!("Malformed timer row: {e}"))
            })?;
            processor.process(&timer, now).await.inspect_err(|e| {
                tracing::error!("❌ Timer '{}' failed: {e}", timer.id);
            })
        }
    });

    let results = join_all(runs).await;
    let successful = results.iter().filter(|r| r.is_ok()).count();
    let summary = RunSummary {
        total,
        successful,
        failed: total - successful,
    };
    tracing::info!(
        "✅ Run complete: {}/{} succeeded, {} failed",
        summary.successful,
        summary.total,
        summary.failed
    );
    Ok(summary)
}
