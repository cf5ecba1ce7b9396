//! Inspect command - open an export and report what it advertises.

use anyhow::{Context, Result};
use blockport_backend::{BackendRegistry, RequestContext};
use tracing::warn;

use super::ConfigSource;

pub fn run(source: &ConfigSource, name: &str) -> Result<()> {
    let config = source.load()?;
    let export = config
        .export(name)
        .with_context(|| format!("No export named `{name}`"))?;

    let registry = BackendRegistry::with_defaults();
    let backend = registry
        .construct(export)
        .with_context(|| format!("Failed to open export `{name}`"))?;

    let ctx = RequestContext::new();
    let geometry = backend.geometry(&ctx);
    let has_fua = backend.has_fua(&ctx);
    let has_flush = backend.has_flush(&ctx);

    if let Err(error) = backend.close(&ctx) {
        warn!(export = name, %error, "failed to close backend");
    }
    let geometry = geometry.with_context(|| format!("Failed to read geometry of `{name}`"))?;

    println!("Export:           {}", export.name);
    println!("Driver:           {}", export.driver);
    println!("Read-only:        {}", export.read_only);
    println!("Size:             {}", geometry.size);
    println!("Min block:        {}", geometry.min_block_size);
    println!("Preferred block:  {}", geometry.preferred_block_size);
    println!("Max block:        {}", geometry.max_block_size);
    println!("FUA:              {has_fua}");
    println!("Flush:            {has_flush}");

    Ok(())
}
