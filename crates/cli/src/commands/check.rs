//! `promptgauge check`: run only the connection preflight.

use std::path::Path;

use anyhow::bail;
use promptgauge_core::Preflight;

use super::BackendArgs;
use crate::render;

pub async fn run(config_path: &Path, backend: BackendArgs) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let mode_config = config.mode_config(&backend.overrides())?;
    let mode = mode_config.mode();

    println!("🔍 Checking {} ({})", mode.display_name(), mode_config.effective_model());
    if let Some(url) = mode_config.effective_base_url() {
        println!("   URL: {url}");
    }

    if !mode.needs_preflight() {
        println!("   No preflight for this mode; problems surface when the prompt is sent.");
        if mode_config.api_key().is_some_and(|k| k.trim().is_empty()) {
            println!("   ⚠️  No API key configured for {}.", mode.display_name());
        }
        return Ok(());
    }

    let outcome = super::preflight(&config).check(&mode_config).await;
    println!("   {}", render::preflight_line(&outcome));
    if !outcome.ok {
        bail!("{} is not ready", mode.display_name());
    }
    Ok(())
}
