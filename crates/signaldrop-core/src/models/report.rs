//! Report model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::util::now_millis;

/// An opaque, globally unique report identifier.
///
/// Freshly generated ids are UUID v7 strings (time-sortable), but any
/// non-empty string is accepted so that seeded or imported ids survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Create a new unique report ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ReportId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for ReportId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("report id cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Sync lifecycle status of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Locally modified, not yet acknowledged remotely
    Offline,
    /// Remote exchange in flight
    Syncing,
    /// Acknowledged by the remote
    Synced,
    /// Remote divergence detected; carries a remote version
    Conflict,
}

impl ReportStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [Self; 4] = [Self::Offline, Self::Syncing, Self::Synced, Self::Conflict];

    /// Stored/display name of this status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "syncing" => Ok(Self::Syncing),
            "synced" => Ok(Self::Synced),
            "conflict" => Ok(Self::Conflict),
            other => Err(Error::InvalidInput(format!("unknown report status: {other}"))),
        }
    }
}

/// A geographic position attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in degrees
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl GeoLocation {
    /// Build a location, rejecting out-of-range coordinates
    pub fn new(latitude: f64, longitude: f64) -> crate::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A field report in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique identifier
    pub id: ReportId,
    /// Non-empty title
    pub title: String,
    /// Free text body, may be empty
    pub content: String,
    /// Ordered tags; duplicates are tolerated
    pub tags: Vec<String>,
    /// Optional position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last edit timestamp (Unix ms)
    pub updated_at: i64,
    /// Sync lifecycle status
    pub status: ReportStatus,
    /// Advanced only by a successful sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_version: Option<i64>,
    /// Divergent remote copy, present only while in `conflict`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_version: Option<Box<Report>>,
}

impl Report {
    /// Create a new, unsynchronized report with a fresh id
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(ReportId::new(), title, content)
    }

    /// Create a new, unsynchronized report with the given id
    #[must_use]
    pub fn with_id(id: ReportId, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            location: None,
            created_at: now,
            updated_at: now,
            status: ReportStatus::Offline,
            sync_version: None,
            remote_version: None,
        }
    }

    /// Bump `updated_at` to now without letting it move backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at).max(self.created_at);
    }

    /// Drop any nested remote version so this copy can itself be embedded.
    #[must_use]
    pub fn into_snapshot(mut self) -> Self {
        self.remote_version = None;
        self
    }

    /// Move into `conflict`, attaching `remote` one level deep.
    pub fn mark_conflict(&mut self, remote: Self) {
        self.status = ReportStatus::Conflict;
        self.remote_version = Some(Box::new(remote.into_snapshot()));
    }

    /// Leave `conflict` for `status`, detaching the remote version.
    pub fn clear_conflict(&mut self, status: ReportStatus) -> Option<Self> {
        self.status = status;
        self.remote_version.take().map(|remote| *remote)
    }

    /// Next sync version after a successful exchange
    #[must_use]
    pub fn next_sync_version(&self) -> i64 {
        self.sync_version.unwrap_or(0) + 1
    }

    /// Check the model invariants of a stored report.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let remote_matches_status =
            self.remote_version.is_some() == (self.status == ReportStatus::Conflict);
        let not_nested = self
            .remote_version
            .as_ref()
            .is_none_or(|remote| remote.remote_version.is_none());
        remote_matches_status && not_nested && self.updated_at >= self.created_at
    }
}

/// Parse a comma separated tag list, trimming and dropping empties.
///
/// # Examples
///
/// ```
/// use signaldrop_core::models::parse_tags;
///
/// assert_eq!(parse_tags(" flood, roads ,,north"), vec!["flood", "roads", "north"]);
/// ```
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Sort reports newest-first by `updated_at`, as the list views consume them.
pub fn sort_by_recent(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
