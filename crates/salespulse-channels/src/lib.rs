//! # SalesPulse Channels
//!
//! Outbound delivery channels. Each implements `NotificationSink` from
//! salespulse-core; the engine never sees past the trait.

pub mod email;

pub use email::EmailSink;
