//! Deployment module

pub mod api;
pub mod client;
pub mod fsm;
pub mod outcome;
pub mod policy;
pub mod status;
