mod commands;
mod export;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "doushu")]
#[command(about = "Crawl and export a Douban book collection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the subject's collection into the local store
    Crawl(commands::crawl::CrawlArgs),
    /// Export stored records as CSV or an HTML report
    Export(commands::export::ExportArgs),
    /// Remove a subject's stored records
    Clear(commands::clear::ClearArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("doushu=info".parse().unwrap())
                .add_directive("doushu_lib=info".parse().unwrap())
                .add_directive("doushu_scrape=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Crawl(args) => commands::crawl::run(args).await?,
        Commands::Export(args) => commands::export::run(args)?,
        Commands::Clear(args) => commands::clear::run(args)?,
    }

    Ok(())
}
