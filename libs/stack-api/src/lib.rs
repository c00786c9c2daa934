//! Stack orchestration API models
//!
//! Payloads exchanged with the remote orchestration service.

pub mod models;
