//! AWS-oriented adapters and handlers for the inventory pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, capability
//! traits over object storage, the inventory table and the alert topic, and
//! environment configuration). Domain coercion lives in `inventory_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;
