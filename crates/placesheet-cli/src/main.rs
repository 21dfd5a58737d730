mod commands;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "placesheet")]
#[command(about = "Collect map listings and write them to a spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect listings and write them to the sheet (the default).
    Run(RunArgs),
    /// Collect listings and print them as JSON without touching the sheet.
    Collect(CollectArgs),
    /// Obtain or refresh the spreadsheet credential and store it.
    Auth,
}

#[derive(Debug, Default, Args)]
struct CollectArgs {
    /// Maximum number of result cards to visit.
    #[arg(long)]
    limit: Option<usize>,
    /// Results page to open instead of the configured search URL.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    #[command(flatten)]
    collect: CollectArgs,
    /// Target range, e.g. `A1` or `Sheet1!A1`.
    #[arg(long)]
    range: Option<String>,
    /// Spreadsheet id, overriding `GOOGLE_SHEET_ID`.
    #[arg(long)]
    sheet_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = placesheet_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(args)) => commands::run_pipeline(&config, &args).await?,
        Some(Commands::Collect(args)) => commands::run_collect(&config, &args).await?,
        Some(Commands::Auth) => commands::run_auth(&config).await?,
        None => commands::run_pipeline(&config, &RunArgs::default()).await?,
    }

    Ok(())
}
