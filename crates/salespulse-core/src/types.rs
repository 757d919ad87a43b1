//! Record types — the storage contract shared with the rest of the CRM.
//!
//! Field names are the wire format of the hosted store and must not change:
//! the admin UI reads and writes the same rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timers table name.
pub const TIMERS_TABLE: &str = "timers";
/// Notifications table name.
pub const NOTIFICATIONS_TABLE: &str = "notifications";
/// Sales reps table name (the user directory).
pub const SALES_TABLE: &str = "sales";

/// A scheduled follow-up obligation attached to a CRM entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    /// Store-assigned row id.
    pub id: String,
    /// Subject record reference (owned elsewhere in the CRM).
    pub entity_type: String,
    pub entity_id: String,
    #[serde(default)]
    pub timer_type: String,
    /// Severity label — display text only, never branches behavior.
    #[serde(default = "default_priority")]
    pub priority: String,
    pub action_required: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Primary recipient id.
    pub assigned_to: String,
    /// Additional recipient ids. Duplicates are preserved as-is.
    #[serde(default)]
    pub notify_also: Vec<String>,
    /// Delivery channel names. Only "email" triggers external delivery;
    /// every channel gets an in-app notification row.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default = "default_status")]
    pub status: TimerStatus,
    #[serde(default)]
    pub recurrence_enabled: bool,
    /// "daily", "weekly", or "monthly". Kept as a string: rows with an
    /// unknown pattern must still deserialize so the run can retire them.
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
    #[serde(default = "default_interval")]
    pub recurrence_interval: i64,
    /// "none", "after_n_times", or "until_date".
    #[serde(default)]
    pub recurrence_end_condition: Option<String>,
    /// Count or ISO date, depending on the end condition.
    #[serde(default)]
    pub recurrence_end_value: Option<String>,
    #[serde(default)]
    pub trigger_count: i64,
    /// Run eligibility key — due when at or before now.
    #[serde(default)]
    pub next_trigger: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_triggered: Option<DateTime<Utc>>,
}

fn default_priority() -> String {
    "medium".into()
}
fn default_status() -> TimerStatus {
    TimerStatus::Active
}
fn default_interval() -> i64 {
    1
}

/// Timer lifecycle state. Completed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Active,
    Completed,
}

impl Timer {
    /// Full recipient set: assigned_to plus notify_also, duplicates kept.
    /// One notification row is created per listed id.
    pub fn recipients(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(1 + self.notify_also.len());
        out.push(self.assigned_to.clone());
        out.extend(self.notify_also.iter().cloned());
        out
    }

    /// Whether external email delivery is requested.
    pub fn wants_email(&self) -> bool {
        self.channels.iter().any(|c| c == "email")
    }
}

/// One in-app notification row per (timer, recipient) per processing run.
/// Immutable after creation; the UI flips `read` later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub timer_id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub entity_type: String,
    pub entity_id: String,
    pub read: bool,
}

impl Notification {
    /// Build the notification row for one recipient of a timer.
    pub fn from_timer(timer: &Timer, user_id: &str) -> Self {
        Self {
            timer_id: timer.id.clone(),
            user_id: user_id.to_string(),
            title: format!(
                "{}: {}",
                timer.priority.to_uppercase(),
                timer.action_required
            ),
            message: timer
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| timer.action_required.clone()),
            priority: timer.priority.clone(),
            entity_type: timer.entity_type.clone(),
            entity_id: timer.entity_id.clone(),
            read: false,
        }
    }
}

/// A sales rep record — the user directory for email resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRep {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}
