//! Expiry audit for application registration credentials.
//!
//! Lists app registrations from Microsoft Graph, flags secrets and
//! certificates expiring inside a warning window, and reports them to an
//! administrator and to owners tagged with `NotifyEmail=` in the app notes.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Scan, owner resolution, rendering, dispatch, orchestration
//! - `graph` — Token, directory and mail collaborators
//! - `models` — Data structures
//! - `util` — Filesystem, logging, journald

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod graph;
pub mod models;
pub mod util;
