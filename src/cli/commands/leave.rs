use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_collection, output_record, output_success, require_role};
use crate::cli::OutputFormat;
use crate::portal::Portal;
use crate::resources::leave::{self, LeaveStatus};
use crate::types::Role;

#[derive(Subcommand)]
pub enum LeaveCommands {
    #[command(about = "List leave requests by status")]
    List {
        #[arg(long, default_value = "PENDING", help = "PENDING, APPROVED or REJECTED")]
        status: LeaveStatus,
    },

    #[command(about = "Show one leave request")]
    Show {
        #[arg(help = "Leave id")]
        id: i64,
    },

    #[command(about = "Approve a leave request")]
    Approve {
        #[arg(help = "Leave id")]
        id: i64,
    },

    #[command(about = "Reject a leave request")]
    Reject {
        #[arg(help = "Leave id")]
        id: i64,
    },
}

pub async fn handle(cmd: LeaveCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    require_role(portal, &[Role::Admin])?;

    let (id, status) = match cmd {
        LeaveCommands::List { status } => {
            let leaves = portal
                .call(|t| async move { leave::list_by_status(&t, status).await })
                .await?;
            return output_collection(
                &output_format,
                "leaves",
                &leaves,
                &format!("No {} leave requests", status.as_str().to_lowercase()),
            );
        }
        LeaveCommands::Show { id } => {
            let request = portal.call(|t| async move { leave::get(&t, id).await }).await?;
            return output_record(&output_format, &request);
        }
        LeaveCommands::Approve { id } => (id, LeaveStatus::Approved),
        LeaveCommands::Reject { id } => (id, LeaveStatus::Rejected),
    };

    let updated = portal
        .call(|t| async move { leave::set_status(&t, id, status).await })
        .await?;
    output_success(
        &output_format,
        &format!("Leave {} {}", id, status.as_str().to_lowercase()),
        Some(json!({ "leave": updated })),
    )
}
