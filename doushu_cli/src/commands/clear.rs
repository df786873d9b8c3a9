//! The `clear` subcommand: remove a subject's stored records.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use doushu_lib::store::RecordStore;
use doushu_lib::SqliteStore;

/// Arguments for the `clear` subcommand.
#[derive(Args)]
pub struct ClearArgs {
    /// SQLite database path
    #[arg(long, default_value = "doushu.db")]
    pub db: PathBuf,

    /// Subject id (defaults to the last crawled subject)
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(args: &ClearArgs) -> Result<()> {
    let mut store = SqliteStore::open(&args.db)?;
    store.init()?;

    let subject = match &args.user {
        Some(user) => user.clone(),
        None => store
            .get_current_subject()?
            .ok_or_else(|| anyhow!("no subject crawled yet; pass --user"))?,
    };

    store.delete(&subject)?;
    eprintln!("Cleared stored records for {}", subject);
    Ok(())
}
