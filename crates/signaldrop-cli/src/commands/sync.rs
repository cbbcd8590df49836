use signaldrop_core::sync::SkipReason;
use signaldrop_core::SyncPass;

use crate::commands::common::{CliContext, Session};
use crate::error::CliError;

pub async fn run_sync(should_fail: bool, ctx: &CliContext) -> Result<(), CliError> {
    let session = Session::open(ctx)?;
    let pass = session.service.sync_now(should_fail).await?;
    println!("{}", describe_pass(&pass));
    Ok(())
}

pub fn describe_pass(pass: &SyncPass) -> String {
    match pass {
        SyncPass::Skipped(SkipReason::Disconnected) => {
            "Sync skipped: network is not online".to_string()
        }
        SyncPass::Skipped(SkipReason::AlreadyRunning) => {
            "Sync skipped: another pass is in progress".to_string()
        }
        SyncPass::Completed(summary) if summary.attempted == 0 => {
            "Nothing to sync".to_string()
        }
        SyncPass::Completed(summary) => format!(
            "Synced {} of {} report(s); {} failed, {} in conflict",
            summary.synced, summary.attempted, summary.failed, summary.diverged
        ),
    }
}
