use signaldrop_core::ReportStatus;

use crate::commands::common::{
    format_report_lines, report_to_list_item, CliContext, ReportListItem, Session,
};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    status: Option<ReportStatus>,
    as_json: bool,
    ctx: &CliContext,
) -> Result<(), CliError> {
    let session = Session::open(ctx)?;
    let mut reports = match status {
        Some(status) => session.service.list_by_status(status).await?,
        None => session.service.list().await?,
    };
    reports.truncate(limit);

    if as_json {
        let json_items = reports
            .iter()
            .map(report_to_list_item)
            .collect::<Vec<ReportListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if reports.is_empty() {
        println!("No reports.");
    } else {
        for line in format_report_lines(&reports) {
            println!("{line}");
        }
    }

    Ok(())
}
