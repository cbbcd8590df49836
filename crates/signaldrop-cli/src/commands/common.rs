use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde::Serialize;
use signaldrop_core::config::SyncSettings;
use signaldrop_core::{
    Connectivity, GeoLocation, Report, ReportId, ReportService, ReportStatus, StoreLocation,
    SyncPass,
};

use crate::error::CliError;

pub const DB_PATH_ENV_VAR: &str = "SIGNALDROP_DB_PATH";

/// Per-invocation settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub db_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub network: Connectivity,
}

/// An opened report service plus the user's auto-sync preference.
///
/// The service itself never spawns passes here; a short-lived process awaits
/// them in the foreground instead.
pub struct Session {
    pub service: ReportService,
    auto_sync: bool,
}

impl Session {
    pub fn open(ctx: &CliContext) -> Result<Self, CliError> {
        let mut settings = SyncSettings::resolve(ctx.config_path.as_deref())?;
        let auto_sync = settings.auto_sync;
        settings.auto_sync = false;

        let service = ReportService::open(StoreLocation::Path(ctx.db_path.clone()), settings);
        service.set_connectivity(ctx.network);
        Ok(Self { service, auto_sync })
    }

    /// Run a pass after a local change when auto-sync is on and online.
    pub async fn sync_after_change(&self) -> Result<Option<SyncPass>, CliError> {
        if !self.auto_sync || !self.service.connectivity().is_connected() {
            return Ok(None);
        }
        let pass = self.service.sync_now(false).await?;
        tracing::debug!(?pass, "Auto-sync after local change");
        Ok(Some(pass))
    }
}

#[derive(Debug, Serialize)]
pub struct ReportListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub status: ReportStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
    pub tags: Vec<String>,
    pub sync_version: Option<i64>,
}

/// Look a report up by exact id, then by unique id prefix.
pub async fn resolve_report(query: &str, service: &ReportService) -> Result<Report, CliError> {
    if let Some(report) = service.get(&ReportId::from(query)).await? {
        return Ok(report);
    }

    let mut matching_ids = service
        .store()
        .get_all()
        .await?
        .into_iter()
        .map(|report| report.id)
        .filter(|id| id.as_str().starts_with(query))
        .collect::<Vec<_>>();
    matching_ids.sort();

    match matching_ids.as_slice() {
        [] => Err(CliError::ReportNotFound(query.to_string())),
        [id] => service
            .get(id)
            .await?
            .ok_or_else(|| CliError::ReportNotFound(query.to_string())),
        _ => {
            let options = matching_ids
                .iter()
                .take(3)
                .map(|id| id.as_str().chars().take(13).collect::<String>())
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousReportId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn format_report_lines(reports: &[Report]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();

    reports
        .iter()
        .map(|report| {
            let id_prefix = report.id.as_str().chars().take(8).collect::<String>();
            let tags = render_tags(report);
            let mut line = format!(
                "{id_prefix:<8}  {:<8}  {:>8}  {}",
                report.status,
                format_relative_time(report.updated_at, now_ms),
                report_preview(report, 60)
            );
            if !tags.is_empty() {
                line.push_str("  ");
                line.push_str(&tags);
            }
            line
        })
        .collect()
}

pub fn report_to_list_item(report: &Report) -> ReportListItem {
    let mut tags = report.tags.clone();
    tags.sort();

    ReportListItem {
        id: report.id.to_string(),
        title: report.title.clone(),
        preview: report_preview(report, 80),
        status: report.status,
        created_at: report.created_at,
        updated_at: report.updated_at,
        relative_time: format_relative_time(report.updated_at, Utc::now().timestamp_millis()),
        tags,
        sync_version: report.sync_version,
    }
}

/// Title followed by the first body line, collapsed and truncated.
pub fn report_preview(report: &Report, max_chars: usize) -> String {
    let first_line = report.content.lines().next().unwrap_or("").trim();
    let joined = if first_line.is_empty() {
        report.title.clone()
    } else {
        format!("{}: {first_line}", report.title)
    };
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags(report: &Report) -> String {
    let mut tags = report.tags.clone();
    tags.sort();
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Full multi-line rendering used by `show`.
pub fn format_report_detail(report: &Report) -> Vec<String> {
    let mut lines = vec![
        format!("{}  [{}]", report.title, report.status),
        format!("id:       {}", report.id),
        format!("created:  {}", format_timestamp(report.created_at)),
        format!("updated:  {}", format_timestamp(report.updated_at)),
    ];
    if let Some(version) = report.sync_version {
        lines.push(format!("version:  {version}"));
    }
    if let Some(location) = report.location {
        lines.push(format!(
            "location: {:.5}, {:.5}",
            location.latitude, location.longitude
        ));
    }
    let tags = render_tags(report);
    if !tags.is_empty() {
        lines.push(format!("tags:     {tags}"));
    }
    if !report.content.is_empty() {
        lines.push(String::new());
        lines.extend(report.content.lines().map(ToString::to_string));
    }
    if let Some(remote) = &report.remote_version {
        lines.push(String::new());
        lines.push(format!(
            "Remote copy ({}): {}",
            format_timestamp(remote.updated_at),
            remote.title
        ));
        lines.extend(remote.content.lines().map(|line| format!("  {line}")));
    }
    lines
}

pub fn parse_location(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoLocation>, CliError> {
    match (lat, lng) {
        (Some(latitude), Some(longitude)) => Ok(Some(GeoLocation::new(latitude, longitude)?)),
        _ => Ok(None),
    }
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_title(title_parts: &[String]) -> Result<String, CliError> {
    normalize_content(&title_parts.join(" ")).ok_or(CliError::EmptyTitle)
}

pub fn normalize_report_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyReportId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_report_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let report_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&report_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_report_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("signaldrop-report-{}-{now}.md", std::process::id()))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    cli_db_path
        .or_else(|| env::var_os(DB_PATH_ENV_VAR).map(PathBuf::from))
        .or_else(default_db_path)
        .ok_or(CliError::NoDataDir)
}

pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("signaldrop").join("signaldrop.db"))
}
