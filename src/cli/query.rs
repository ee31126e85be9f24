//! Translation lookup from the command line.

use anyhow::{Context, Result};

use crate::cli::QueryArgs;
use crate::config::SiteConfig;
use crate::translate::find_available_translation;

/// Run one lookup and print the outcome as JSON.
pub fn run(args: &QueryArgs, config: &SiteConfig) -> Result<()> {
    let registry = config.slug_registry()?;
    let store = config.http_store()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let outcome = rt.block_on(find_available_translation(
        &store,
        &registry,
        &args.path,
        &args.locale,
        args.target.as_deref(),
    ));

    let json = if args.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{json}");
    Ok(())
}
