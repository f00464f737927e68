//! `promptgauge providers`: list backend modes and their defaults.

use promptgauge_core::request::{
    CloudProvider, DEFAULT_CUSTOM_BASE_URL, DEFAULT_CUSTOM_MODEL, DEFAULT_MANAGED_MODEL,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL,
};

pub fn run() -> anyhow::Result<()> {
    println!("🤖 Backend modes");
    println!("================");
    println!();
    for (mode, auth, model) in rows() {
        println!("  {mode:<12} {auth:<34} {model}");
    }
    println!();
    println!("  Ollama URL:      {DEFAULT_OLLAMA_URL}");
    println!("  Custom base URL: {DEFAULT_CUSTOM_BASE_URL} (any OpenAI-compatible endpoint)");
    println!();
    println!("  Environment variables:");
    println!("    PROMPTGAUGE_MODE, PROMPTGAUGE_API_KEY, PROMPTGAUGE_MODEL,");
    println!("    PROMPTGAUGE_BASE_URL, OLLAMA_HOST, PUTER_AUTH_TOKEN");
    Ok(())
}

fn rows() -> Vec<(String, &'static str, String)> {
    let mut rows = vec![
        (
            "managed".to_string(),
            "managed session (PUTER_AUTH_TOKEN)",
            DEFAULT_MANAGED_MODEL.to_string(),
        ),
        (
            "ollama".to_string(),
            "none (local daemon)",
            DEFAULT_OLLAMA_MODEL.to_string(),
        ),
    ];
    rows.extend(CloudProvider::ALL.iter().map(|p| {
        (
            p.as_str().to_string(),
            "API key",
            p.default_model().to_string(),
        )
    }));
    rows.push((
        "custom".to_string(),
        "API key (bearer)",
        DEFAULT_CUSTOM_MODEL.to_string(),
    ));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_is_listed() {
        let names: Vec<_> = rows().into_iter().map(|(mode, _, _)| mode).collect();
        assert_eq!(
            names,
            vec!["managed", "ollama", "openrouter", "anthropic", "openai", "google", "custom"]
        );
        for name in &names {
            assert!(name.parse::<promptgauge_core::ProviderMode>().is_ok());
        }
    }
}
