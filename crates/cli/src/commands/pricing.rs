//! `promptgauge pricing`: show the catalog costs are projected against.

use std::path::Path;

use crate::render;

pub fn run(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let catalog = config.catalog()?;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        return Ok(());
    }

    println!("💲 Pricing (USD per million tokens)");
    println!();
    print!("{}", render::pricing_table(&catalog));
    if !config.pricing.is_empty() {
        println!();
        println!("Custom catalog from {}", config_path.display());
    }
    Ok(())
}
