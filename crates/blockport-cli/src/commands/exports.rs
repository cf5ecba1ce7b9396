//! Exports command - list configured exports.

use anyhow::Result;
use blockport_backend::{BackendRegistry, PATH_PARAMETER};

use super::ConfigSource;

pub fn run(source: &ConfigSource) -> Result<()> {
    let config = source.load()?;
    let registry = BackendRegistry::with_defaults();

    println!("Server: {}", config.server.address);
    if config.exports.is_empty() {
        println!("No exports configured.");
        return Ok(());
    }

    println!();
    println!("{:<16} {:<10} {:<4} PATH", "NAME", "DRIVER", "MODE");
    for export in &config.exports {
        let mode = if export.read_only { "ro" } else { "rw" };
        let driver = if registry.contains(&export.driver) {
            export.driver.clone()
        } else {
            format!("{}?", export.driver)
        };
        println!(
            "{:<16} {:<10} {:<4} {}",
            export.name,
            driver,
            mode,
            export.parameter(PATH_PARAMETER).unwrap_or("-")
        );
    }

    Ok(())
}
