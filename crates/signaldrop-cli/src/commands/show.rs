use crate::commands::common::{
    format_report_detail, normalize_report_identifier, resolve_report, CliContext, Session,
};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, ctx: &CliContext) -> Result<(), CliError> {
    let normalized_id = normalize_report_identifier(id)?;
    let session = Session::open(ctx)?;
    let report = resolve_report(&normalized_id, &session.service).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report_detail(&report) {
            println!("{line}");
        }
    }
    Ok(())
}
