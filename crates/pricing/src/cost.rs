//! Cost projection over the catalog.

use promptgauge_core::CostRow;

use crate::catalog::PricingCatalog;

/// Hourly price of a cloud GPU able to serve a 70B model.
const GPU_HOURLY_USD: f64 = 3.20;
/// Sustained throughput of that GPU, tokens per second.
const GPU_TOKENS_PER_SEC: f64 = 1_500.0;

/// One cost row per catalog entry, in catalog order.
///
/// `cost_per_run_usd = input/1e6 * input_price + output/1e6 * output_price`;
/// the 100- and 1000-run figures are exact multiples of it.
pub fn cost_rows(catalog: &PricingCatalog, input_tokens: u64, output_tokens: u64) -> Vec<CostRow> {
    catalog
        .entries()
        .iter()
        .map(|entry| {
            let per_run = entry.cost(input_tokens, output_tokens);
            CostRow {
                provider: entry.provider.clone(),
                model_name: entry.model_name.clone(),
                input_price_per_mtok: entry.input_price_per_mtok,
                output_price_per_mtok: entry.output_price_per_mtok,
                cost_per_run_usd: per_run,
                cost_per_100_runs_usd: per_run * 100.0,
                cost_per_1000_runs_usd: per_run * 1000.0,
            }
        })
        .collect()
}

/// Effective cost per million tokens on a rented GPU.
pub fn gpu_cost_per_mtok() -> f64 {
    GPU_HOURLY_USD / (GPU_TOKENS_PER_SEC * 3600.0 / 1_000_000.0)
}

/// Self-hosting note for a prompt of this size, used when the backend
/// supplied none.
pub fn self_hosted_note(input_tokens: u64, output_tokens: u64) -> String {
    let total = input_tokens + output_tokens;
    let per_mtok = gpu_cost_per_mtok();
    let per_run = total as f64 / 1_000_000.0 * per_mtok;
    let seconds = total as f64 / GPU_TOKENS_PER_SEC;
    format!(
        "Self-hosted: a 7B model via Ollama runs this prompt for effectively $0 in API fees, \
         with noticeably lower quality. A 70B model on a cloud GPU at ~${GPU_HOURLY_USD:.2}/hr \
         with ~{GPU_TOKENS_PER_SEC:.0} tok/sec throughput works out to roughly ${per_mtok:.2} per \
         million tokens, about ${per_run:.6} and {seconds:.1}s per run for ~{total} tokens."
    )
}
