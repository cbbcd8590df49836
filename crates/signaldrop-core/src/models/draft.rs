//! Caller input for creating and editing reports

use serde::{Deserialize, Serialize};

use super::{GeoLocation, Report, ReportId};
use crate::error::{Error, Result};

/// Fields supplied by the caller when creating a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

impl ReportDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Turn the draft into a fresh `offline` report with the given id.
    pub fn into_report(self, id: ReportId) -> Result<Report> {
        let title = validate_title(&self.title)?;
        let mut report = Report::with_id(id, title, self.content);
        report.tags = self.tags;
        report.location = self.location;
        Ok(report)
    }
}

/// Partial update of an existing report; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<Option<GeoLocation>>,
}

impl ReportPatch {
    /// Whether applying this patch would change nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.location.is_none()
    }

    /// Apply the patch as a local edit: fields overwritten, status reset to
    /// `offline`, `updated_at` bumped.
    ///
    /// Editing a report that is in `conflict` keeps its remote version so the
    /// divergence still has to be resolved explicitly.
    pub fn apply(self, report: &mut Report) -> Result<()> {
        if let Some(title) = self.title {
            report.title = validate_title(&title)?;
        }
        if let Some(content) = self.content {
            report.content = content;
        }
        if let Some(tags) = self.tags {
            report.tags = tags;
        }
        if let Some(location) = self.location {
            report.location = location;
        }
        if report.remote_version.is_none() {
            report.status = super::ReportStatus::Offline;
        }
        report.touch();
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput("report title cannot be empty".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportStatus;

    #[test]
    fn draft_rejects_blank_title() {
        let err = ReportDraft::new("  ").into_report(ReportId::new());
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn draft_builds_offline_report() {
        let report = ReportDraft::new(" Road closed ")
            .content("Tree down")
            .tags(["roads", "storm"])
            .into_report("r-1".into())
            .unwrap();

        assert_eq!(report.title, "Road closed");
        assert_eq!(report.tags, vec!["roads", "storm"]);
        assert_eq!(report.status, ReportStatus::Offline);
        assert_eq!(report.id.as_str(), "r-1");
    }

    #[test]
    fn patch_resets_status_and_bumps_timestamp() {
        let mut report = Report::new("Title", "Body");
        report.status = ReportStatus::Synced;
        report.sync_version = Some(3);
        report.updated_at = report.created_at;

        ReportPatch {
            content: Some("Edited".into()),
            ..ReportPatch::default()
        }
        .apply(&mut report)
        .unwrap();

        assert_eq!(report.content, "Edited");
        assert_eq!(report.status, ReportStatus::Offline);
        assert_eq!(report.sync_version, Some(3));
        assert!(report.updated_at >= report.created_at);
    }

    #[test]
    fn patch_on_conflict_keeps_divergence() {
        let mut report = Report::new("Title", "Body");
        report.mark_conflict(Report::new("Remote", "Other"));

        ReportPatch {
            title: Some("Renamed".into()),
            ..ReportPatch::default()
        }
        .apply(&mut report)
        .unwrap();

        assert_eq!(report.status, ReportStatus::Conflict);
        assert!(report.is_consistent());
    }

    #[test]
    fn patch_can_clear_location() {
        let mut report = Report::new("Title", "");
        report.location = Some(GeoLocation::new(1.0, 1.0).unwrap());

        ReportPatch {
            location: Some(None),
            ..ReportPatch::default()
        }
        .apply(&mut report)
        .unwrap();

        assert!(report.location.is_none());
    }
}
