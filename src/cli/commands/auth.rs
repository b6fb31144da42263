use clap::Subcommand;
use serde_json::json;

use crate::auth::RegistrationForm;
use crate::cli::utils::{output_record, output_success, require_role};
use crate::cli::OutputFormat;
use crate::guard::role_home;
use crate::portal::Portal;
use crate::resources::users;
use crate::types::Role;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the portal")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "PAYROLL_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
        #[arg(long, help = "Portal to log in through (ADMIN or EMPLOYEE)")]
        portal: Option<Role>,
    },

    #[command(about = "Logout and forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information from the server")]
    Whoami,

    #[command(about = "Register a new account")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "PAYROLL_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Phone number (10 digits)")]
        phone: String,
        #[arg(long, default_value = "", help = "Postal address")]
        address: String,
        #[arg(long, default_value = "", help = "Date of birth (YYYY-MM-DD or DD/MM/YYYY)")]
        dob: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password, portal: selected } => {
            let landing = match selected {
                Some(role) => portal
                    .login_to_portal(&username, &password, &role)
                    .await?
                    .path()
                    .to_string(),
                None => match portal.login(&username, &password).await?.role {
                    Some(role) => portal.navigate(role_home(&role)).path().to_string(),
                    None => portal.current_view(),
                },
            };
            let role = portal.role().map(|r| r.to_string());

            output_success(
                &output_format,
                &format!("Logged in as {}", username),
                Some(json!({ "username": username, "role": role, "home": landing })),
            )
        }
        AuthCommands::Logout => {
            portal.logout().await?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = portal.session();
            let authenticated = portal.is_authenticated();
            let data = json!({
                "authenticated": authenticated,
                "username": session.as_ref().and_then(|s| s.username.clone()),
                "role": session.as_ref().and_then(|s| s.role.as_ref().map(Role::to_string)),
                "user_id": session.as_ref().and_then(|s| s.user_id),
                "view": portal.current_view(),
            });
            match output_format {
                OutputFormat::Json => output_record(&output_format, &data),
                OutputFormat::Text => {
                    match session.and_then(|s| s.username) {
                        Some(name) => println!("Logged in as {}", name),
                        None if authenticated => println!("Logged in"),
                        None => println!("Not logged in"),
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Whoami => {
            require_role(portal, &[])?;
            let me = portal.call(|t| async move { users::me(&t).await }).await?;
            output_record(&output_format, &me)
        }
        AuthCommands::Register {
            username,
            email,
            password,
            first_name,
            last_name,
            phone,
            address,
            dob,
        } => {
            let form = RegistrationForm {
                username,
                password,
                email,
                first_name,
                last_name,
                phone,
                address,
                dob,
            };
            let created = portal.register(&form).await?;
            output_success(
                &output_format,
                &format!("Registered {}", form.username.trim()),
                Some(created),
            )
        }
    }
}
