//! Timer processor — everything one timer needs in one processing run.
//!
//! Step order is fixed: notification rows are written before recurrence and
//! the state update, so delivery trouble can never skip the timer's
//! progression. A failed insert leaves the timer untouched (it stays due and
//! retries next run); a failed update after notifications were written is an
//! accepted at-least-once window.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use salespulse_core::traits::{Filter, NotificationSink, RecordStore};
use salespulse_core::types::{
    NOTIFICATIONS_TABLE, Notification, SALES_TABLE, SalesRep, TIMERS_TABLE, Timer,
};
use salespulse_core::Result;

use crate::recurrence;

/// Processes one due timer against the store and the outbound channel.
pub struct TimerProcessor {
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn NotificationSink>,
}

impl TimerProcessor {
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Run one processing pass for `timer` at reference time `now`.
    ///
    /// Returns Err only for the recoverable per-timer failures (notification
    /// insert, state update). Email delivery and directory lookup failures
    /// are logged and swallowed.
    pub async fn process(&self, timer: &Timer, now: DateTime<Utc>) -> Result<()> {
        let recipients = timer.recipients();

        let rows = recipients
            .iter()
            .map(|user_id| serde_json::to_value(Notification::from_timer(timer, user_id)))
            .collect::<std::result::Result<Vec<Value>, _>>()?;
        self.store.insert(NOTIFICATIONS_TABLE, rows).await?;

        if timer.wants_email() {
            self.deliver_emails(timer, &recipients).await;
        }

        let outcome = recurrence::advance(timer, now);
        let patch = json!({
            "last_triggered": now.to_rfc3339(),
            "trigger_count": timer.trigger_count + 1,
            "next_trigger": outcome.next_trigger.map(|t| t.to_rfc3339()),
            "status": outcome.status,
        });
        self.store.update(TIMERS_TABLE, &timer.id, patch).await?;

        tracing::info!(
            "🔔 Timer '{}' processed ({} recipient(s), next: {:?})",
            timer.id,
            recipients.len(),
            outcome.next_trigger
        );
        Ok(())
    }

    /// Best-effort email fan-out. Nothing here can fail the timer: a
    /// directory lookup error skips the whole email leg, a per-recipient
    /// send error skips that recipient only.
    async fn deliver_emails(&self, timer: &Timer, recipients: &[String]) {
        let filter = Filter::new().any_of("id", recipients.to_vec());
        let rows = match self.store.query(SALES_TABLE, &filter).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("⚠️ Recipient lookup failed for timer '{}': {e}", timer.id);
                return;
            }
        };

        let mut addresses: HashMap<String, String> = HashMap::new();
        for row in rows {
            if let Ok(rep) = serde_json::from_value::<SalesRep>(row)
                && let Some(email) = rep.email
            {
                addresses.insert(rep.id, email);
            }
        }

        let (subject, body) = email_content(timer);
        for user_id in recipients {
            let Some(address) = addresses.get(user_id) else {
                tracing::warn!("⚠️ No email address for recipient {user_id}, skipping");
                continue;
            };
            if let Err(e) = self.sink.send(address, &subject, &body).await {
                tracing::warn!("⚠️ Email to {user_id} <{address}> failed: {e}");
            }
        }
    }
}

/// Subject/body for the email leg — same title as the in-app row.
fn email_content(timer: &Timer) -> (String, String) {
    let subject = format!(
        "{}: {}",
        timer.priority.to_uppercase(),
        timer.action_required
    );
    let detail = timer
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| timer.action_required.clone());
    let body = format!(
        "{detail}\n\nRegarding: {} {}\nPriority: {}",
        timer.entity_type, timer.entity_id, timer.priority
    );
    (subject, body)
}
