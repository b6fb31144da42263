use chrono::NaiveDate;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;

use crate::cli::utils::{output_collection, output_record, output_success, require_role};
use crate::cli::OutputFormat;
use crate::portal::Portal;
use crate::resources::employees::{self, NewEmployee};
use crate::types::{Role, UserId};

#[derive(Subcommand)]
pub enum EmployeeCommands {
    #[command(about = "List employees")]
    List,

    #[command(about = "Show one employee")]
    Show {
        #[arg(help = "Employee id")]
        id: i64,
    },

    #[command(about = "Create an employee profile for an existing user")]
    Create {
        #[arg(long, help = "Id of the user account to attach")]
        user_id: UserId,
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Date of birth (YYYY-MM-DD)")]
        dob: Option<NaiveDate>,
        #[arg(long, default_value = "", help = "Phone number")]
        phone: String,
        #[arg(long, default_value = "", help = "Postal address")]
        address: String,
        #[arg(long, default_value = "", help = "Designation")]
        designation: String,
        #[arg(long, default_value = "", help = "Department")]
        department: String,
        #[arg(long, help = "Monthly base salary")]
        base_salary: Option<Decimal>,
    },

    #[command(about = "Delete an employee")]
    Delete {
        #[arg(help = "Employee id")]
        id: i64,
    },
}

pub async fn handle(cmd: EmployeeCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    require_role(portal, &[Role::Admin])?;

    match cmd {
        EmployeeCommands::List => {
            let list = portal.call(|t| async move { employees::list(&t).await }).await?;
            output_collection(&output_format, "employees", &list, "No employees found")
        }
        EmployeeCommands::Show { id } => {
            let employee = portal.call(|t| async move { employees::get(&t, id).await }).await?;
            output_record(&output_format, &employee)
        }
        EmployeeCommands::Create {
            user_id,
            first_name,
            last_name,
            dob,
            phone,
            address,
            designation,
            department,
            base_salary,
        } => {
            let employee = NewEmployee {
                user_id,
                first_name,
                last_name,
                dob,
                phone,
                address,
                designation,
                department,
                base_salary,
            };
            let created = portal
                .create_with_fallback_shape(&employee.to_linked_create()?)
                .await?;
            output_success(
                &output_format,
                &format!("Employee created for user {}", user_id),
                Some(json!({ "employee": created })),
            )
        }
        EmployeeCommands::Delete { id } => {
            portal.call(|t| async move { employees::delete(&t, id).await }).await?;
            output_success(&output_format, &format!("Employee {} deleted", id), None)
        }
    }
}
