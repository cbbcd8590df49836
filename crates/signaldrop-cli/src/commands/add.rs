use signaldrop_core::models::parse_tags;
use signaldrop_core::ReportDraft;

use crate::commands::common::{
    normalize_content, normalize_title, parse_location, read_piped_stdin, CliContext, Session,
};
use crate::error::CliError;

pub async fn run_add(
    title_parts: &[String],
    content: Option<String>,
    tags: Option<&str>,
    (lat, lng): (Option<f64>, Option<f64>),
    ctx: &CliContext,
) -> Result<(), CliError> {
    let title = normalize_title(title_parts)?;
    let content = match content {
        Some(content) => normalize_content(&content),
        None => read_piped_stdin()?,
    };

    let mut draft = ReportDraft::new(title)
        .content(content.unwrap_or_default())
        .tags(tags.map(parse_tags).unwrap_or_default());
    if let Some(location) = parse_location(lat, lng)? {
        draft = draft.location(location);
    }

    let session = Session::open(ctx)?;
    let report = session.service.create(draft).await?;
    session.sync_after_change().await?;

    println!("{}", report.id);
    Ok(())
}
