use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_collection, output_record, output_success, require_role};
use crate::cli::OutputFormat;
use crate::portal::Portal;
use crate::resources::employees::{self, ProfileUpdate};
use crate::resources::leave::{self, LeaveApplication, LeaveSummary};
use crate::resources::payroll;
use crate::resources::ResourceKind;
use crate::types::Role;

const MEMBER_ROLES: [Role; 2] = [Role::Employee, Role::Admin];

#[derive(Subcommand)]
pub enum MeCommands {
    #[command(about = "Show my employee profile")]
    Profile,

    #[command(about = "List my leave requests")]
    Leaves {
        #[arg(long, help = "Year for the approved-leave count (defaults to this year)")]
        year: Option<i32>,
    },

    #[command(about = "Show my payslip for a month")]
    Payslip {
        #[arg(help = "Year, e.g. 2024")]
        year: i32,
        #[arg(help = "Month, 1-12")]
        month: u32,
    },

    #[command(about = "Update my contact details")]
    UpdateProfile {
        #[arg(long, help = "Phone number")]
        phone: Option<String>,
        #[arg(long, help = "Postal address")]
        address: Option<String>,
        #[arg(long, help = "Designation")]
        designation: Option<String>,
        #[arg(long, help = "Department")]
        department: Option<String>,
    },

    #[command(about = "Apply for leave")]
    ApplyLeave {
        #[arg(help = "First day (YYYY-MM-DD)")]
        start: NaiveDate,
        #[arg(help = "Last day (YYYY-MM-DD)")]
        end: NaiveDate,
        #[arg(long = "type", default_value = "PAID", help = "Leave type")]
        leave_type: String,
        #[arg(long, help = "Reason shown to the reviewer")]
        reason: Option<String>,
    },
}

pub async fn handle(cmd: MeCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    require_role(portal, &MEMBER_ROLES)?;

    match cmd {
        MeCommands::Profile => {
            let profile = portal.resolve_mine(ResourceKind::EmployeeProfile).await?;
            output_record(&output_format, &profile)
        }
        MeCommands::Leaves { year } => {
            let resolved = portal.resolve_mine(ResourceKind::Leaves).await?;
            let leaves = resolved.as_array().cloned().unwrap_or_default();
            let year = year.unwrap_or_else(|| Local::now().year());
            let summary = LeaveSummary::from_leaves(&leaves, year);

            output_collection(&output_format, "leaves", &leaves, "No leave requests")?;
            if let OutputFormat::Text = output_format {
                println!(
                    "{} total, {} approved ({} in {}), {} pending, {} rejected",
                    summary.total,
                    summary.approved,
                    summary.approved_in_year,
                    year,
                    summary.pending,
                    summary.rejected
                );
            }
            Ok(())
        }
        MeCommands::Payslip { year, month } => {
            let payslip = portal
                .call(|t| async move { payroll::my_payslip(&t, year, month).await })
                .await?;
            output_record(&output_format, &payslip)
        }
        MeCommands::UpdateProfile {
            phone,
            address,
            designation,
            department,
        } => {
            let update = ProfileUpdate {
                phone,
                address,
                designation,
                department,
            };
            let profile = portal
                .call(|t| async move { employees::update_profile(&t, &update).await })
                .await?;
            output_success(&output_format, "Profile updated", Some(profile))
        }
        MeCommands::ApplyLeave {
            start,
            end,
            leave_type,
            reason,
        } => {
            let application = LeaveApplication {
                start_date: start,
                end_date: end,
                leave_type,
                reason,
            };
            let created = portal
                .call(|t| async move { leave::apply(&t, &application).await })
                .await?;
            output_success(
                &output_format,
                &format!("Leave requested from {} to {}", start, end),
                Some(json!({ "leave": created })),
            )
        }
    }
}
