use signaldrop_core::models::parse_tags;
use signaldrop_core::ReportPatch;

use crate::commands::common::{
    capture_editor_input_with_initial, normalize_report_identifier, parse_location,
    resolve_report, CliContext, Session,
};
use crate::error::CliError;

/// Field changes requested on the command line
#[derive(Debug, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub clear_location: bool,
}

impl EditArgs {
    fn into_patch(self) -> Result<ReportPatch, CliError> {
        let location = if self.clear_location {
            Some(None)
        } else {
            parse_location(self.lat, self.lng)?.map(Some)
        };

        Ok(ReportPatch {
            title: self.title,
            content: self.content,
            tags: self.tags.as_deref().map(parse_tags),
            location,
        })
    }
}

pub async fn run_edit(id: &str, args: EditArgs, ctx: &CliContext) -> Result<(), CliError> {
    let normalized_id = normalize_report_identifier(id)?;
    let session = Session::open(ctx)?;
    let report = resolve_report(&normalized_id, &session.service).await?;

    let mut patch = args.into_patch()?;
    if patch.is_empty() {
        let Some(edited_content) = capture_editor_input_with_initial(&report.content)? else {
            return Err(CliError::EmptyEditedContent);
        };

        if edited_content == report.content {
            println!("{}", report.id);
            return Ok(());
        }
        patch.content = Some(edited_content);
    }

    let Some(updated) = session.service.update(&report.id, patch).await? else {
        return Err(CliError::ReportNotFound(normalized_id));
    };
    session.sync_after_change().await?;

    println!("{}", updated.id);
    Ok(())
}
