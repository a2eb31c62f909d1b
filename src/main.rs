//! farmlog - offline-first farm weather advice and transaction categorization
//!
//! Shows cached weather with a farming advisory, refreshing it when the
//! network allows, and suggests categories for transaction descriptions.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use farmlog::app::App;
use farmlog::cli::{join_description, Cli, Command};
use farmlog::config::Settings;
use farmlog::finance::categorize;

/// Sends logs to stderr so command output on stdout stays parseable.
/// `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "farmlog=debug" } else { "farmlog=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Categorize { description } => {
            let description = join_description(description)?;
            let result = categorize(&description);
            println!("{}/{}", result.kind.label(), result.category);
        }
        Command::Weather { json } => {
            let app = App::new(&Settings::from_cli(&cli)?)?;
            println!("{}", app.weather_report(*json).await?);
        }
        Command::Advice => {
            let app = App::new(&Settings::from_cli(&cli)?)?;
            println!("{}", app.advice().await);
        }
    }

    Ok(())
}
