use clap::Subcommand;

use crate::cli::utils::{output_collection, output_record, require_role};
use crate::cli::OutputFormat;
use crate::portal::Portal;
use crate::resources::reports;
use crate::types::Role;

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Totals for a month's payroll")]
    Summary {
        #[arg(help = "Year, e.g. 2024")]
        year: i32,
        #[arg(help = "Month, 1-12")]
        month: u32,
    },

    #[command(about = "Payroll cost per department for a month")]
    DepartmentCost {
        #[arg(help = "Year, e.g. 2024")]
        year: i32,
        #[arg(help = "Month, 1-12")]
        month: u32,
    },
}

pub async fn handle(cmd: ReportCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    require_role(portal, &[Role::Admin])?;

    match cmd {
        ReportCommands::Summary { year, month } => {
            let summary = portal
                .call(|t| async move { reports::payroll_summary(&t, year, month).await })
                .await?;
            output_record(&output_format, &summary)
        }
        ReportCommands::DepartmentCost { year, month } => {
            let rows = portal
                .call(|t| async move { reports::department_cost(&t, year, month).await })
                .await?;
            output_collection(&output_format, "departments", &rows, "No payroll cost recorded")
        }
    }
}
