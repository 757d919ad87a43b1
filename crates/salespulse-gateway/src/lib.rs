//! # SalesPulse Gateway
//!
//! The HTTP trigger surface. An external scheduler (cron, hosted job
//! runner) POSTs to `/api/v1/timers/process` to kick one batch run; the
//! response is the aggregate summary only — per-timer detail goes to the
//! log.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
