use crate::commands::common::{normalize_report_identifier, resolve_report, CliContext, Session};
use crate::error::CliError;

pub async fn run_delete(id: &str, ctx: &CliContext) -> Result<(), CliError> {
    let normalized_id = normalize_report_identifier(id)?;
    let session = Session::open(ctx)?;
    let report = resolve_report(&normalized_id, &session.service).await?;

    session.service.delete(&report.id).await?;
    println!("{}", report.id);
    Ok(())
}
