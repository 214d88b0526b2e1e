//! Core audit logic.

pub mod config;
pub mod dispatch;
pub mod grouping;
pub mod orchestrator;
pub mod owner;
pub mod report;
pub mod scanner;
