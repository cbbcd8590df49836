//! Report export helpers shared by every client.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{GeoLocation, Report, ReportStatus};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Flattened report used in JSON and Markdown exports.
///
/// The attached remote copy of a conflicted report is reduced to a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub created_at: i64,
    pub updated_at: i64,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_version: Option<i64>,
    pub has_remote_version: bool,
}

/// Convert a report into an export record with stable tag ordering.
#[must_use]
pub fn report_to_export_item(report: &Report) -> ExportReport {
    let mut tags = report.tags.clone();
    tags.sort();

    ExportReport {
        id: report.id.to_string(),
        title: report.title.clone(),
        content: report.content.clone(),
        tags,
        location: report.location,
        created_at: report.created_at,
        updated_at: report.updated_at,
        status: report.status,
        sync_version: report.sync_version,
        has_remote_version: report.remote_version.is_some(),
    }
}

/// Render reports as pretty-printed JSON.
pub fn render_json_export(reports: &[Report]) -> serde_json::Result<String> {
    let items = reports
        .iter()
        .map(report_to_export_item)
        .collect::<Vec<ExportReport>>();
    serde_json::to_string_pretty(&items)
}

/// Render reports in Markdown, one frontmatter block and heading per report.
#[must_use]
pub fn render_markdown_export(reports: &[Report]) -> String {
    let mut output = String::new();

    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let item = report_to_export_item(report);
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", item.id);
        let _ = writeln!(output, "status: {}", item.status);
        let _ = writeln!(output, "created_at: {}", item.created_at);
        let _ = writeln!(output, "updated_at: {}", item.updated_at);
        if let Some(version) = item.sync_version {
            let _ = writeln!(output, "sync_version: {version}");
        }
        if let Some(location) = item.location {
            let _ = writeln!(output, "location: {}, {}", location.latitude, location.longitude);
        }
        let _ = writeln!(output, "tags:");
        for tag in &item.tags {
            let _ = writeln!(output, "  - {tag}");
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        let _ = writeln!(output, "# {}", item.title);
        if !item.content.is_empty() {
            let _ = writeln!(output);
            output.push_str(&item.content);
            output.push('\n');
        }
    }

    output
}

/// Render reports in the selected format.
pub fn render_reports_export(
    reports: &[Report],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(reports),
        ExportFormat::Markdown => Ok(render_markdown_export(reports)),
    }
}

/// Default file name for an export written at `timestamp_ms`.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("signaldrop-export-{timestamp_ms}.{}", format.extension())
}
