use crate::commands::common::{CliContext, Session};
use crate::error::CliError;

pub async fn run_status(as_json: bool, ctx: &CliContext) -> Result<(), CliError> {
    let session = Session::open(ctx)?;
    let counts = session.service.status_counts().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!("network:  {}", session.service.connectivity());
    println!("offline:  {}", counts.offline);
    println!("syncing:  {}", counts.syncing);
    println!("synced:   {}", counts.synced);
    println!("conflict: {}", counts.conflict);
    Ok(())
}
