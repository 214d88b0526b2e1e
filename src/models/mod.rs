//! Data structures shared across the crate.

pub mod application;
pub mod config_file;
pub mod policy;
pub mod record;
