//! # SalesPulse Engine
//!
//! The timer processing core: scans due follow-up timers, fans out
//! notifications per recipient, computes the next recurrence, and advances
//! timer state — one batch per external trigger.
//!
//! ## Architecture
//! ```text
//! run_due_timers (per trigger)
//!   ├── query: status=active AND next_trigger<=now
//!   ├── per timer, concurrently (failures isolated):
//!   │     ├── insert one notification row per recipient
//!   │     ├── channels has "email" → resolve addresses, send (best effort)
//!   │     ├── recurrence::advance → (status, next_trigger)
//!   │     └── update timer: last_triggered, trigger_count+1, next_trigger, status
//!   └── RunSummary { total, successful, failed }
//! ```
//!
//! Failure model: the initial query is fatal; a notification-insert or
//! state-update failure fails only that timer; email delivery and directory
//! lookup failures are logged and swallowed.

pub mod dispatcher;
pub mod processor;
pub mod recurrence;

pub use dispatcher::{RunSummary, run_due_timers};
pub use processor::TimerProcessor;
pub use recurrence::{RecurrenceOutcome, advance};
