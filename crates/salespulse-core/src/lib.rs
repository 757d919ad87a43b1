//! # SalesPulse Core
//!
//! Shared foundation for the SalesPulse timer engine: the record types that
//! form the storage contract, the error type, configuration, and the
//! capability traits (`RecordStore`, `NotificationSink`) the engine is
//! written against. Implementations live in sibling crates so the engine can
//! be tested against in-memory fakes.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{GatewayConfig, PulseConfig, SmtpConfig, StoreConfig};
pub use error::{PulseError, Result};
pub use traits::{Clause, Filter, NotificationSink, RecordStore};
pub use types::{Notification, SalesRep, Timer, TimerStatus};
