pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ClientError;
use crate::portal::Portal;

#[derive(Parser)]
#[command(name = "payroll")]
#[command(about = "Payroll CLI - Command-line client for the payroll portal API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, logout and account registration")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Self-service views for the logged-in employee")]
    Me {
        #[command(subcommand)]
        cmd: commands::me::MeCommands,
    },

    #[command(about = "Employee records (admin)")]
    Employees {
        #[command(subcommand)]
        cmd: commands::employees::EmployeeCommands,
    },

    #[command(about = "Leave review (admin)")]
    Leave {
        #[command(subcommand)]
        cmd: commands::leave::LeaveCommands,
    },

    #[command(about = "Payroll runs (admin)")]
    Payroll {
        #[command(subcommand)]
        cmd: commands::payroll::PayrollCommands,
    },

    #[command(about = "Monthly payroll reports (admin)")]
    Reports {
        #[command(subcommand)]
        cmd: commands::reports::ReportCommands,
    },

    #[command(about = "Check where the portal would send the current session")]
    Route {
        #[command(subcommand)]
        cmd: commands::route::RouteCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let mut portal = Portal::open_with_file_store(config::config()).await?;

    let result = dispatch(cli.command, output_format.clone(), &mut portal).await;

    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        let code = e.downcast_ref::<ClientError>().map(ClientError::error_code);
        utils::output_error(&output_format, &e.to_string(), code)?;
    }
    result
}

async fn dispatch(command: Commands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    match command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format, portal).await,
        Commands::Me { cmd } => commands::me::handle(cmd, output_format, portal).await,
        Commands::Employees { cmd } => commands::employees::handle(cmd, output_format, portal).await,
        Commands::Leave { cmd } => commands::leave::handle(cmd, output_format, portal).await,
        Commands::Payroll { cmd } => commands::payroll::handle(cmd, output_format, portal).await,
        Commands::Reports { cmd } => commands::reports::handle(cmd, output_format, portal).await,
        Commands::Route { cmd } => commands::route::handle(cmd, output_format, portal).await,
    }
}
