use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_collection, output_success, require_role};
use crate::cli::OutputFormat;
use crate::portal::Portal;
use crate::resources::payroll;
use crate::types::Role;

#[derive(Subcommand)]
pub enum PayrollCommands {
    #[command(about = "List payroll runs")]
    Runs,

    #[command(about = "Create a draft run for a month")]
    CreateRun {
        #[arg(help = "Year, e.g. 2024")]
        year: i32,
        #[arg(help = "Month, 1-12")]
        month: u32,
    },

    #[command(about = "Compute payslips for a run")]
    Process {
        #[arg(help = "Run id")]
        id: i64,
    },

    #[command(about = "Lock a processed run")]
    Lock {
        #[arg(help = "Run id")]
        id: i64,
    },

    #[command(about = "List the payslip items of a run")]
    Items {
        #[arg(help = "Run id")]
        id: i64,
    },

    #[command(about = "Delete a draft run")]
    DeleteRun {
        #[arg(help = "Run id")]
        id: i64,
    },
}

pub async fn handle(cmd: PayrollCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    require_role(portal, &[Role::Admin])?;

    match cmd {
        PayrollCommands::Runs => {
            let runs = portal.call(|t| async move { payroll::list_runs(&t).await }).await?;
            output_collection(&output_format, "runs", &runs, "No payroll runs")
        }
        PayrollCommands::CreateRun { year, month } => {
            let run = portal
                .call(|t| async move { payroll::create_run(&t, year, month).await })
                .await?;
            output_success(
                &output_format,
                &format!("Payroll run created for {}-{:02}", year, month),
                Some(json!({ "run": run })),
            )
        }
        PayrollCommands::Process { id } => {
            let run = portal.call(|t| async move { payroll::process_run(&t, id).await }).await?;
            output_success(&output_format, &format!("Run {} processed", id), Some(json!({ "run": run })))
        }
        PayrollCommands::Lock { id } => {
            let run = portal.call(|t| async move { payroll::lock_run(&t, id).await }).await?;
            output_success(&output_format, &format!("Run {} locked", id), Some(json!({ "run": run })))
        }
        PayrollCommands::Items { id } => {
            let items = portal.call(|t| async move { payroll::run_items(&t, id).await }).await?;
            output_collection(&output_format, "items", &items, "Run has no items")
        }
        PayrollCommands::DeleteRun { id } => {
            portal.call(|t| async move { payroll::delete_run(&t, id).await }).await?;
            output_success(&output_format, &format!("Run {} deleted", id), None)
        }
    }
}
