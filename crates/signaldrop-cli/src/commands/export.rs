use std::path::{Path, PathBuf};

use chrono::Utc;
use signaldrop_core::export::{render_reports_export, suggested_export_file_name};

use crate::cli::ExportFormat;
use crate::commands::common::{CliContext, Session};
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    ctx: &CliContext,
) -> Result<(), CliError> {
    let session = Session::open(ctx)?;
    let reports = session.service.list().await?;
    let rendered = render_reports_export(&reports, format.into())?;

    if let Some(path) = output_path {
        let path = resolve_export_path(path, format, Utc::now().timestamp_millis());
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// A directory target gets a generated, timestamped file name inside it.
pub fn resolve_export_path(path: &Path, format: ExportFormat, timestamp_ms: i64) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(format.into(), timestamp_ms))
    } else {
        path.to_path_buf()
    }
}
