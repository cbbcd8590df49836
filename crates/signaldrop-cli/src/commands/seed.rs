use crate::commands::common::{CliContext, Session};
use crate::error::CliError;

pub async fn run_seed(ctx: &CliContext) -> Result<(), CliError> {
    let session = Session::open(ctx)?;
    let count = session.service.seed_samples().await?;
    println!("Seeded {count} sample report(s)");
    Ok(())
}
