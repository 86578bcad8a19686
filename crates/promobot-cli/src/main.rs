mod commands;

use clap::{Parser, Subcommand};

use promobot_core::Platform;

#[derive(Debug, Parser)]
#[command(name = "promobot-cli")]
#[command(about = "Storefront promotion robot command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the persisted configuration and the next scheduled run
    Status,
    /// Run the promotion job once with the persisted configuration
    RunNow,
    /// Save the promotion configuration, validating the schedule first
    Configure {
        /// Target platform (Instagram, Facebook, TikTok, LinkedIn)
        #[arg(long)]
        platform: Option<Platform>,

        /// Message tone, e.g. Fun, Urgent, Professional, Luxury
        #[arg(long)]
        tone: Option<String>,

        /// Collection to promote, or "all" for the whole catalog
        #[arg(long)]
        collection: Option<String>,

        /// Posts per run
        #[arg(long)]
        items_per_run: Option<u32>,

        /// Local fire time as HH:MM
        #[arg(long)]
        time: Option<String>,

        /// IANA timezone the fire time is local to
        #[arg(long)]
        timezone: Option<String>,
    },
    /// List the storefront collections available for targeting
    Collections,
    /// Audit the catalog's SEO health
    SeoAudit,
    /// Generate SEO alt text for a product name
    AltText {
        #[arg(long)]
        title: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = promobot_core::load_app_config_from_env()?;

    match cli.command {
        Commands::Status => commands::status(&config),
        Commands::RunNow => commands::run_now(&config).await,
        Commands::Configure {
            platform,
            tone,
            collection,
            items_per_run,
            time,
            timezone,
        } => commands::configure(
            &config,
            commands::ConfigureArgs {
                platform,
                tone,
                collection,
                items_per_run,
                time,
                timezone,
            },
        ),
        Commands::Collections => commands::collections(&config).await,
        Commands::SeoAudit => commands::seo_audit(&config).await,
        Commands::AltText { title } => commands::alt_text(&config, &title).await,
    }
}
