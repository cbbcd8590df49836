//! signaldrop-core - Core library for SignalDrop
//!
//! This crate contains the report model, the SQLite-backed report store, the
//! sync engine with its conflict protocol, and the report service used by
//! every SignalDrop interface (CLI today, UI layers later).

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod services;
pub mod sync;
mod util;

pub use error::{Error, Result};
pub use models::{GeoLocation, Report, ReportDraft, ReportId, ReportPatch, ReportStatus};
pub use notify::{Notifier, Subscription};
pub use services::{ReportService, ReportStore, StoreLocation};
pub use sync::{Connectivity, Resolution, SyncEngine, SyncPass};
