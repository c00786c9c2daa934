//! HTTP transport to the orchestration service

pub mod client;
pub mod stacks;
