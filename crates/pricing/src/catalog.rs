//! Built-in pricing catalog for the models costs are projected against.
//!
//! Prices are in USD per 1 million tokens. Each entry has an input and an
//! output price. A replacement catalog can be supplied via TOML config.

use serde::{Deserialize, Serialize};

use crate::PricingError;

/// Per-million-token pricing for one commercial model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub provider: String,
    pub model_name: String,
    /// Price per 1M input tokens in USD.
    pub input_price_per_mtok: f64,
    /// Price per 1M output tokens in USD.
    pub output_price_per_mtok: f64,
}

impl PricingEntry {
    pub fn new(
        provider: impl Into<String>,
        model_name: impl Into<String>,
        input_price_per_mtok: f64,
        output_price_per_mtok: f64,
    ) -> Self {
        Self {
            provider: provider.into(),
            model_name: model_name.into(),
            input_price_per_mtok,
            output_price_per_mtok,
        }
    }

    /// Compute the cost of one run with the given token counts.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 / 1_000_000.0 * self.input_price_per_mtok
            + output_tokens as f64 / 1_000_000.0 * self.output_price_per_mtok
    }

    /// The line embedded in the assessment instructions.
    pub fn prompt_line(&self) -> String {
        format!(
            "- {} {}: ${:.2} input / ${:.2} output per million tokens",
            self.provider, self.model_name, self.input_price_per_mtok, self.output_price_per_mtok
        )
    }

    fn validate(&self) -> Result<(), PricingError> {
        for (label, price) in [
            ("input", self.input_price_per_mtok),
            ("output", self.output_price_per_mtok),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(PricingError::InvalidPrice {
                    provider: self.provider.clone(),
                    model_name: self.model_name.clone(),
                    reason: format!("{label} price must be > 0, got {price}"),
                });
            }
        }
        Ok(())
    }
}

/// Immutable, ordered pricing table.
///
/// Nothing mutates a catalog once built, so one instance can be shared
/// behind an `Arc` across any number of normalizations.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingCatalog {
    entries: Vec<PricingEntry>,
}

impl PricingCatalog {
    /// Build a catalog, rejecting empty tables and non-positive prices.
    pub fn new(entries: Vec<PricingEntry>) -> Result<Self, PricingError> {
        if entries.is_empty() {
            return Err(PricingError::Empty);
        }
        for entry in &entries {
            entry.validate()?;
        }
        Ok(Self { entries })
    }

    /// The built-in table (early 2026 list prices).
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                // ── Anthropic ──────────────────────────────────────────────
                PricingEntry::new("Anthropic", "Claude Opus 4.6", 15.0, 75.0),
                PricingEntry::new("Anthropic", "Claude Sonnet 4.6", 3.0, 15.0),
                PricingEntry::new("Anthropic", "Claude Haiku 4.5", 0.8, 4.0),
                // ── OpenAI ─────────────────────────────────────────────────
                PricingEntry::new("OpenAI", "GPT-4o", 2.5, 10.0),
                PricingEntry::new("OpenAI", "GPT-4o mini", 0.15, 0.6),
                PricingEntry::new("OpenAI", "o1", 15.0, 60.0),
                PricingEntry::new("OpenAI", "o3-mini", 1.1, 4.4),
                // ── Google ─────────────────────────────────────────────────
                PricingEntry::new("Google", "Gemini 2.0 Flash", 0.1, 0.4),
                PricingEntry::new("Google", "Gemini 1.5 Pro", 1.25, 5.0),
                PricingEntry::new("Google", "Gemini 2.5 Pro", 1.25, 10.0),
                // ── xAI ────────────────────────────────────────────────────
                PricingEntry::new("xAI", "Grok-3", 3.0, 15.0),
                // ── Meta (via Groq) ────────────────────────────────────────
                PricingEntry::new("Meta / Groq", "Llama 3.3 70B", 0.59, 0.79),
            ],
        }
    }

    /// Entries in report order.
    pub fn entries(&self) -> &[PricingEntry] {
        &self.entries
    }

    /// The pricing block embedded in the assessment instructions.
    pub fn prompt_lines(&self) -> String {
        self.entries
            .iter()
            .map(PricingEntry::prompt_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of models in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
