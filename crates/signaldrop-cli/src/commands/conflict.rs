use signaldrop_core::{ReportStatus, Resolution};

use crate::commands::common::{normalize_report_identifier, resolve_report, CliContext, Session};
use crate::error::CliError;

pub async fn run_conflict_inject(id: &str, ctx: &CliContext) -> Result<(), CliError> {
    let normalized_id = normalize_report_identifier(id)?;
    let session = Session::open(ctx)?;
    let report = resolve_report(&normalized_id, &session.service).await?;

    let Some(conflicted) = session.service.inject_conflict(&report.id).await? else {
        return Err(CliError::ReportNotFound(normalized_id));
    };
    println!("{}", conflicted.id);
    Ok(())
}

pub async fn run_conflict_resolve(
    id: &str,
    strategy: Resolution,
    ctx: &CliContext,
) -> Result<(), CliError> {
    let normalized_id = normalize_report_identifier(id)?;
    let session = Session::open(ctx)?;
    let report = resolve_report(&normalized_id, &session.service).await?;
    if report.status != ReportStatus::Conflict {
        return Err(CliError::NotInConflict(report.id.to_string()));
    }

    let Some(resolved) = session.service.resolve_conflict(&report.id, strategy).await? else {
        return Err(CliError::ReportNotFound(normalized_id));
    };
    tracing::info!(report_id = %resolved.id, "Resolved conflict with {strategy}");
    session.sync_after_change().await?;

    println!("{}", resolved.id);
    Ok(())
}
