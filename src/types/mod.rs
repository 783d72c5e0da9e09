//! Value types owned by the panel core.

pub mod config;
pub mod query;
pub mod record;
