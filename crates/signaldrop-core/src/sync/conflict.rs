//! Conflict fabrication and resolution.
//!
//! These are pure transformations on a [`Report`]; the engine persists the
//! result and notifies observers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::{Report, ReportStatus};
use crate::util::now_millis;

/// Appended to the title of a fabricated remote edit
pub const REMOTE_TITLE_MARKER: &str = " (Remote Edit)";

/// Appended to the content of a fabricated remote edit
pub const REMOTE_CONTENT_MARKER: &str = "\n\n[Remote changes made while offline]";

/// Placed between local and remote content by [`Resolution::Merge`]
pub const MERGE_SEPARATOR: &str = "\n\n---\nRemote changes:\n";

/// How far ahead of local time a fabricated remote edit is stamped
const REMOTE_EDIT_LEAD_MS: i64 = 1000;

/// Strategy for settling a report in `conflict`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Keep local fields; the report must sync again
    Local,
    /// Adopt the remote copy, already the server's truth
    Remote,
    /// Keep the local title and append the remote content
    Merge,
}

impl Resolution {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "merge" => Ok(Self::Merge),
            other => Err(Error::InvalidInput(format!(
                "unknown resolution '{other}' (expected local, remote, or merge)"
            ))),
        }
    }
}

/// Build the divergent copy a concurrent remote edit would have produced.
#[must_use]
pub fn fabricate_remote_edit(report: &Report) -> Report {
    let mut remote = report.clone().into_snapshot();
    remote.title = format!("{}{REMOTE_TITLE_MARKER}", report.title);
    remote.content = format!("{}{REMOTE_CONTENT_MARKER}", report.content);
    remote.updated_at = now_millis().max(report.updated_at) + REMOTE_EDIT_LEAD_MS;
    remote.sync_version = Some(report.next_sync_version());
    remote
}

/// Content produced by [`Resolution::Merge`]
#[must_use]
pub fn merge_content(local: &str, remote: &str) -> String {
    format!("{local}{MERGE_SEPARATOR}{remote}")
}

/// Settle `report` with `strategy`.
///
/// Returns `None` when the report carries no remote version.
#[must_use]
pub fn resolve(mut report: Report, strategy: Resolution) -> Option<Report> {
    let settled = match strategy {
        Resolution::Remote => ReportStatus::Synced,
        Resolution::Local | Resolution::Merge => ReportStatus::Offline,
    };
    report.remote_version.as_ref()?;
    let remote = report.clear_conflict(settled)?;

    let resolved = match strategy {
        Resolution::Local => {
            report.touch();
            report
        }
        Resolution::Remote => {
            let mut adopted = remote;
            adopted.id = report.id;
            adopted.status = settled;
            adopted.sync_version = adopted.sync_version.max(report.sync_version);
            adopted.updated_at = adopted.updated_at.max(adopted.created_at);
            adopted.into_snapshot()
        }
        Resolution::Merge => {
            report.content = merge_content(&report.content, &remote.content);
            report.touch();
            report
        }
    };

    Some(resolved)
}
