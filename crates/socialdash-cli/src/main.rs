mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use socialdash_core::TimeSeriesMetric;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "socialdash-cli")]
#[command(about = "LinkedIn analytics dashboard from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the configured products.
    Products,
    /// Load every panel and print the dashboard as JSON.
    Snapshot {
        #[command(flatten)]
        filters: FilterArgs,
        /// Metric plotted by the engagement-over-time panel.
        #[arg(long)]
        metric: Option<TimeSeriesMetric>,
        /// Post table page (1-based).
        #[arg(long)]
        page: Option<u32>,
    },
    /// Print one page of the post engagement table.
    Posts {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Aggregate metrics from the metrics endpoint.
    Metrics {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Raw content-engagement breakdown.
    ContentEngagement {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Search posts by keyword within the product and date scope.
    Search {
        keyword: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Upload spreadsheets, then reload the dashboard if all succeed.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Product id; defaults to SOCIALDASH_DEFAULT_PRODUCT.
    #[arg(long)]
    product: Option<String>,
    /// Range start (YYYY-MM-DD); requires --to.
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD); requires --from.
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = socialdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, api = %config.api_base_url, "starting");

    match cli.command {
        Commands::Products => commands::products(&config),
        Commands::Snapshot {
            filters,
            metric,
            page,
        } => commands::snapshot(&config, &filters, metric, page).await,
        Commands::Posts { filters, page } => commands::posts(&config, &filters, page).await,
        Commands::Metrics { filters } => commands::metrics(&config, &filters).await,
        Commands::ContentEngagement { filters } => {
            commands::content_engagement(&config, &filters).await
        }
        Commands::Search { keyword, filters } => {
            commands::search(&config, &keyword, &filters).await
        }
        Commands::Upload { files } => commands::upload(&config, &files).await,
    }
}
