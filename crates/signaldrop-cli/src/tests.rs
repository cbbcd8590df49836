use std::path::PathBuf;

use clap::CommandFactory;
use pretty_assertions::assert_eq;
use signaldrop_core::sync::{PassSummary, SkipReason};
use signaldrop_core::{Connectivity, Report, ReportId, ReportStatus, Resolution, SyncPass};
use tempfile::TempDir;

use crate::cli::{Cli, ExportFormat};
use crate::commands::add::run_add;
use crate::commands::common::{
    default_editor, format_relative_time, format_timestamp, normalize_content,
    normalize_report_identifier, normalize_title, report_preview, resolve_db_path,
    resolve_report, CliContext, Session,
};
use crate::commands::conflict::{run_conflict_inject, run_conflict_resolve};
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditArgs};
use crate::commands::export::{resolve_export_path, run_export};
use crate::commands::sync::{describe_pass, run_sync};
use crate::error::CliError;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_title_joins_parts() {
    let parts = vec!["Road".to_string(), "closed".to_string()];
    assert_eq!(normalize_title(&parts).unwrap(), "Road closed");
    assert!(matches!(
        normalize_title(&[" ".to_string()]),
        Err(CliError::EmptyTitle)
    ));
}

#[test]
fn normalize_report_identifier_rejects_empty() {
    assert!(matches!(
        normalize_report_identifier("   "),
        Err(CliError::EmptyReportId)
    ));
    assert_eq!(normalize_report_identifier(" abc ").unwrap(), "abc");
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn format_timestamp_returns_utc_label() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn report_preview_joins_title_and_first_line() {
    let report = Report::new("Power out", "Whole block dark\nsecond line");
    assert_eq!(report_preview(&report, 80), "Power out: Whole block dark");
    assert_eq!(report_preview(&report, 12), "Power out...");
}

#[test]
fn describe_pass_covers_outcomes() {
    assert_eq!(
        describe_pass(&SyncPass::Skipped(SkipReason::Disconnected)),
        "Sync skipped: network is not online"
    );
    assert_eq!(
        describe_pass(&SyncPass::Completed(PassSummary::default())),
        "Nothing to sync"
    );
    let summary = PassSummary {
        attempted: 3,
        synced: 2,
        failed: 1,
        diverged: 0,
    };
    assert_eq!(
        describe_pass(&SyncPass::Completed(summary)),
        "Synced 2 of 3 report(s); 1 failed, 0 in conflict"
    );
}

#[test]
fn resolve_db_path_prefers_explicit_flag() {
    let explicit = PathBuf::from("/tmp/explicit.db");
    assert_eq!(resolve_db_path(Some(explicit.clone())).unwrap(), explicit);
}

#[tokio::test]
async fn resolve_report_supports_exact_and_prefix_id() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();
    put_report(&session, "abc-111", "first").await;
    put_report(&session, "abd-222", "second").await;

    let exact = resolve_report("abc-111", &session.service).await.unwrap();
    assert_eq!(exact.title, "first");

    let by_prefix = resolve_report("abd", &session.service).await.unwrap();
    assert_eq!(by_prefix.id.as_str(), "abd-222");
}

#[tokio::test]
async fn resolve_report_rejects_ambiguous_prefix() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();
    put_report(&session, "abc-111", "first").await;
    put_report(&session, "abc-222", "second").await;

    let error = resolve_report("abc", &session.service).await.unwrap_err();
    match error {
        CliError::AmbiguousReportId(message) => {
            assert!(message.contains("abc-111"));
            assert!(message.contains("abc-222"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn resolve_report_rejects_missing_report() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();

    let error = resolve_report("nope", &session.service).await.unwrap_err();
    assert!(matches!(error, CliError::ReportNotFound(id) if id == "nope"));
}

#[tokio::test]
async fn run_add_offline_leaves_report_pending() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);

    run_add(
        &["Tree".to_string(), "down".to_string()],
        Some("Blocking the north lane".to_string()),
        Some("roads, storm"),
        (Some(52.52), Some(13.405)),
        &ctx,
    )
    .await
    .unwrap();

    let reports = all_reports(&ctx).await;
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.title, "Tree down");
    assert_eq!(report.tags, vec!["roads", "storm"]);
    assert_eq!(report.status, ReportStatus::Offline);
    assert!(report.location.is_some());
}

#[tokio::test]
async fn run_add_online_syncs_immediately() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Online);

    run_add(&["Gauge".to_string()], Some(String::new()), None, (None, None), &ctx)
        .await
        .unwrap();

    let reports = all_reports(&ctx).await;
    assert_eq!(reports[0].status, ReportStatus::Synced);
    assert_eq!(reports[0].sync_version, Some(1));
}

#[tokio::test]
async fn run_add_rejects_invalid_location() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);

    let error = run_add(
        &["Somewhere".to_string()],
        Some(String::new()),
        None,
        (Some(95.0), Some(0.0)),
        &ctx,
    )
    .await
    .unwrap_err();
    assert!(matches!(error, CliError::Core(_)));
}

#[tokio::test]
async fn run_edit_updates_fields_and_resets_status() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();
    let mut report = Report::with_id(ReportId::from("edit-1"), "Old", "body");
    report.status = ReportStatus::Synced;
    report.sync_version = Some(3);
    session.service.store().put(&report).await.unwrap();

    let args = EditArgs {
        title: Some("New".to_string()),
        tags: Some("a,b".to_string()),
        ..EditArgs::default()
    };
    run_edit("edit", args, &ctx).await.unwrap();

    let updated = session.service.get(&report.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "New");
    assert_eq!(updated.content, "body");
    assert_eq!(updated.tags, vec!["a", "b"]);
    assert_eq!(updated.status, ReportStatus::Offline);
    assert_eq!(updated.sync_version, Some(3));
}

#[tokio::test]
async fn run_delete_removes_by_prefix_only_the_match() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();
    put_report(&session, "keep-1", "keep").await;
    put_report(&session, "drop-1", "drop").await;

    run_delete("drop", &ctx).await.unwrap();

    let remaining = all_reports(&ctx).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.as_str(), "keep-1");
}

#[tokio::test]
async fn run_sync_with_failure_keeps_reports_offline() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    run_add(&["Pending".to_string()], Some(String::new()), None, (None, None), &ctx)
        .await
        .unwrap();

    let online = CliContext {
        network: Connectivity::Online,
        ..ctx.clone()
    };
    run_sync(true, &online).await.unwrap();
    assert_eq!(all_reports(&ctx).await[0].status, ReportStatus::Offline);

    run_sync(false, &online).await.unwrap();
    assert_eq!(all_reports(&ctx).await[0].status, ReportStatus::Synced);
}

#[tokio::test]
async fn conflict_inject_then_merge_resolve() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();
    put_report(&session, "c-1", "Checkpoint").await;

    run_conflict_inject("c-1", &ctx).await.unwrap();
    let conflicted = session.service.get(&ReportId::from("c-1")).await.unwrap().unwrap();
    assert_eq!(conflicted.status, ReportStatus::Conflict);
    assert!(conflicted.remote_version.is_some());

    run_conflict_resolve("c-1", Resolution::Merge, &ctx)
        .await
        .unwrap();
    let merged = session.service.get(&ReportId::from("c-1")).await.unwrap().unwrap();
    assert_eq!(merged.status, ReportStatus::Offline);
    assert!(merged.remote_version.is_none());
    assert!(merged.content.contains("Remote changes:"));
}

#[tokio::test]
async fn conflict_resolve_requires_conflicted_report() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    let session = Session::open(&ctx).unwrap();
    put_report(&session, "calm-1", "Nothing to see").await;

    let error = run_conflict_resolve("calm-1", Resolution::Local, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::NotInConflict(id) if id == "calm-1"));
}

#[tokio::test]
async fn run_export_writes_json_file() {
    let tmp = TempDir::new().unwrap();
    let ctx = test_ctx(&tmp, Connectivity::Offline);
    run_add(
        &["Export me".to_string()],
        Some("body".to_string()),
        Some("one"),
        (None, None),
        &ctx,
    )
    .await
    .unwrap();

    let output_path = tmp.path().join("export.json");
    run_export(ExportFormat::Json, Some(&output_path), &ctx)
        .await
        .unwrap();

    let exported = std::fs::read_to_string(&output_path).unwrap();
    assert!(exported.contains("\"title\": \"Export me\""));
    assert!(exported.contains("\"tags\": [\n      \"one\"\n    ]"));
    assert!(exported.contains("\"status\": \"offline\""));
}

#[test]
fn export_to_directory_uses_generated_name() {
    let tmp = TempDir::new().unwrap();

    let in_dir = resolve_export_path(tmp.path(), ExportFormat::Markdown, 789);
    assert_eq!(in_dir, tmp.path().join("signaldrop-export-789.md"));

    let explicit = tmp.path().join("out.json");
    assert_eq!(
        resolve_export_path(&explicit, ExportFormat::Json, 789),
        explicit
    );
}

fn test_ctx(tmp: &TempDir, network: Connectivity) -> CliContext {
    let config_path = tmp.path().join("settings.json");
    std::fs::write(
        &config_path,
        r#"{ "latency_min_ms": 0, "latency_max_ms": 0, "seed_samples": false }"#,
    )
    .unwrap();

    CliContext {
        db_path: tmp.path().join("signaldrop.db"),
        config_path: Some(config_path),
        network,
    }
}

async fn put_report(session: &Session, id: &str, title: &str) {
    let report = Report::with_id(ReportId::from(id), title, "");
    session.service.store().put(&report).await.unwrap();
}

async fn all_reports(ctx: &CliContext) -> Vec<Report> {
    Session::open(ctx).unwrap().service.list().await.unwrap()
}
