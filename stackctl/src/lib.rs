//! stackctl library
//!
//! Builds stack requests from user options, submits them to the
//! orchestration service and supervises them until they settle.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod options;
pub mod shutdown;
pub mod storage;
pub mod utils;
