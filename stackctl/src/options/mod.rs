//! Option processing: raw user options to an API-ready stack request

pub mod content;
pub mod exclusive;
pub mod params;
pub mod processor;
