//! # SalesPulse Store
//!
//! `RecordStore` implementations. `RestStore` talks to the hosted CRM
//! backend over its REST API; `MemoryStore` implements the identical
//! contract in memory for tests and local dry runs.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;
