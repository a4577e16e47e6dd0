//! `issue-tracker` - project-scoped issue tracker HTTP API.

use clap::Parser;
use issue_tracker::cli::Cli;
use issue_tracker::run;

#[tokio::main]
async fn main() {
    // Load .env before clap reads the environment.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
