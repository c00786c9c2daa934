//! Application wiring: CLI, resolved options and the deployment entry point

pub mod cli;
pub mod options;
pub mod run;
