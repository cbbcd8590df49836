//! SignalDrop CLI - field reports from the terminal
//!
//! Reports are written to the local store first and pushed to the remote on
//! `signaldrop sync` (or automatically after each change while online).

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands, ConflictCommands};
use crate::commands::add::run_add;
use crate::commands::common::{resolve_db_path, CliContext};
use crate::commands::conflict::{run_conflict_inject, run_conflict_resolve};
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditArgs};
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::seed::run_seed;
use crate::commands::show::run_show;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("signaldrop=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let ctx = CliContext {
        db_path: resolve_db_path(cli.db_path)?,
        config_path: cli.config,
        network: cli.network.into(),
    };

    match command {
        Commands::Add {
            title,
            content,
            tags,
            lat,
            lng,
        } => run_add(&title, content, tags.as_deref(), (lat, lng), &ctx).await?,
        Commands::List {
            limit,
            status,
            json,
        } => run_list(limit, status.map(Into::into), json, &ctx).await?,
        Commands::Show { id, json } => run_show(&id, json, &ctx).await?,
        Commands::Edit {
            id,
            title,
            content,
            tags,
            lat,
            lng,
            clear_location,
        } => {
            let args = EditArgs {
                title,
                content,
                tags,
                lat,
                lng,
                clear_location,
            };
            run_edit(&id, args, &ctx).await?;
        }
        Commands::Delete { id } => run_delete(&id, &ctx).await?,
        Commands::Sync { fail } => run_sync(fail, &ctx).await?,
        Commands::Conflict { command } => match command {
            ConflictCommands::Inject { id } => run_conflict_inject(&id, &ctx).await?,
            ConflictCommands::Resolve { id, strategy } => {
                run_conflict_resolve(&id, strategy.into(), &ctx).await?;
            }
        },
        Commands::Status { json } => run_status(json, &ctx).await?,
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &ctx).await?;
        }
        Commands::Seed => run_seed(&ctx).await?,
    }

    Ok(())
}
