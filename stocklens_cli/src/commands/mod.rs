//! CLI subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use stocklens_lib::store::Store;
use stocklens_lib::stocklens_api::Client;

pub mod history;
pub mod resolve;
pub mod screen;
pub mod seed;
pub mod stocks;
pub mod summarize;
pub mod sync;

/// Opens the store and applies schema migrations.
pub(crate) fn open_store(db: &Path) -> Result<Store> {
    let store = Store::open(db).with_context(|| format!("opening {}", db.display()))?;
    store.init().context("initializing database schema")?;
    Ok(store)
}

/// Builds the provider client from the `POLYGON_API_KEY` environment
/// variable (a `.env` file is honored).
pub(crate) fn api_client() -> Result<Client> {
    let key = std::env::var("POLYGON_API_KEY")
        .context("POLYGON_API_KEY is not set; export it or add it to .env")?;
    Ok(Client::new(&key))
}
