use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] signaldrop_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Report title cannot be empty")]
    EmptyTitle,
    #[error("Report ID cannot be empty")]
    EmptyReportId,
    #[error("Edited report content cannot be empty")]
    EmptyEditedContent,
    #[error("Report not found for id/prefix: {0}")]
    ReportNotFound(String),
    #[error("{0}")]
    AmbiguousReportId(String),
    #[error("Report {0} is not in conflict")]
    NotInConflict(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Could not resolve a data directory; pass --db-path or set SIGNALDROP_DB_PATH")]
    NoDataDir,
}
