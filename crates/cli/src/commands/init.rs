//! `promptgauge init`: first-time setup.

use std::path::Path;

use anyhow::{bail, Context as _};
use promptgauge_config::AppConfig;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() {
        bail!(
            "{} already exists; edit it or remove it first",
            config_path.display()
        );
    }

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    std::fs::write(config_path, AppConfig::default_toml())
        .with_context(|| format!("writing {}", config_path.display()))?;

    println!("✅ Created {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  promptgauge providers        # pick a backend mode");
    println!("  promptgauge check            # verify it is reachable");
    println!("  promptgauge assess \"<prompt>\"");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        run(&path).unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.mode, "managed");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "mode = \"ollama\"\n").unwrap();
        assert!(run(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "mode = \"ollama\"\n");
    }
}
