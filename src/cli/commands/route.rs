use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_record;
use crate::cli::OutputFormat;
use crate::guard::Navigation;
use crate::portal::Portal;

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Show which view a path resolves to for the current session")]
    Check {
        #[arg(help = "View path, e.g. /admin/reports")]
        path: String,
    },
}

pub async fn handle(cmd: RouteCommands, output_format: OutputFormat, portal: &mut Portal) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::Check { path } => {
            let navigation = portal.navigate(&path);
            let redirected = matches!(navigation, Navigation::Redirected { .. });

            match output_format {
                OutputFormat::Json => output_record(
                    &output_format,
                    &json!({
                        "requested": path,
                        "view": navigation.path(),
                        "redirected": redirected,
                    }),
                ),
                OutputFormat::Text => {
                    if redirected {
                        println!("{} -> {}", path, navigation.path());
                    } else {
                        println!("{} (allowed)", path);
                    }
                    Ok(())
                }
            }
        }
    }
}
