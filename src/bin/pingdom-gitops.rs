use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info};

use pingdom_gitops::config::{ApiSettings, Cli, print_usage};
use pingdom_gitops::error::{EXIT_USAGE, GitopsError};
use pingdom_gitops::logging::init_logging;
use pingdom_gitops::reconcile_file;
use pingdom_gitops::version::VERSION;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(_) => {
            print_usage();
            std::process::exit(EXIT_USAGE);
        }
    };

    dotenv::dotenv().ok();
    init_logging();
    info!(version = VERSION, "Starting Pingdom GitOps reconciliation");

    let settings = ApiSettings::from_env(cli.api_key);
    match reconcile_file(&cli.config_path, settings).await {
        Ok(report) => {
            println!("Reconciliation completed: {report}");
        }
        Err(e @ GitopsError::ConfigNotFound(_)) => {
            println!("ERROR: {e}");
            print_usage();
            std::process::exit(e.exit_code());
        }
        Err(e) => {
            error!(error = %e, "Reconciliation failed");
            println!("ERROR: Failed to process Pingdom checks manifest");
            println!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
