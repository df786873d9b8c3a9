//! The `export` subcommand: render stored records to a file.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::Local;
use clap::Args;
use doushu_lib::store::RecordStore;
use doushu_lib::SqliteStore;

use crate::export::{self, ExportFormat};

/// Arguments for the `export` subcommand.
#[derive(Args)]
pub struct ExportArgs {
    /// SQLite database path
    #[arg(long, default_value = "doushu.db")]
    pub db: PathBuf,

    /// Output format: csv or html
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Subject id (defaults to the last crawled subject)
    #[arg(long)]
    pub user: Option<String>,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let format = match args.format.as_str() {
        "csv" => ExportFormat::Csv,
        "html" => ExportFormat::Html,
        other => bail!("unsupported export format: {}", other),
    };

    let store = SqliteStore::open(&args.db)?;
    store.init()?;

    let subject = match &args.user {
        Some(user) => user.clone(),
        None => store
            .get_current_subject()?
            .ok_or_else(|| anyhow!("no subject crawled yet; pass --user"))?,
    };
    let records = store.get(&subject)?;

    let now = Local::now();
    let bytes = match format {
        ExportFormat::Csv => export::to_csv(&records)?,
        ExportFormat::Html => {
            export::to_html(&records, &subject, &now.format("%Y-%m-%d %H:%M").to_string())?
                .into_bytes()
        }
    };

    let path = args
        .out
        .join(export::file_name(&subject, format, now.date_naive()));
    std::fs::write(&path, bytes)?;

    eprintln!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
