//! Database layer for SignalDrop

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{ReportRepository, SqliteReportRepository};
