//! HTTP handlers.

pub mod cache;
pub mod health;
pub mod kpi;
pub mod metrics;
pub mod source;
