//! Terminal rendering of assessment results.

use std::fmt::Write as _;
use std::sync::LazyLock;

use promptgauge_core::{AssessmentResult, CostRow, PreflightOutcome};
use promptgauge_pricing::PricingCatalog;
use regex::Regex;

/// Display rule for a USD amount.
pub fn format_cost(usd: f64) -> String {
    if usd == 0.0 {
        return "$0.00".into();
    }
    if usd < 0.0001 {
        return "< $0.0001".into();
    }
    if usd < 0.01 {
        return format!("${}", trim_zeros(&format!("{usd:.5}")));
    }
    if usd < 1.0 {
        return format!("${}", trim_zeros(&format!("{usd:.4}")));
    }
    format!("${usd:.2}")
}

/// `0.00330` → `0.0033`, `0.10000` → `0.1`, `1.` → `1.0`.
fn trim_zeros(fixed: &str) -> String {
    let trimmed = fixed.trim_end_matches('0');
    match trimmed.strip_suffix('.') {
        Some(int) => format!("{int}.0"),
        None => trimmed.to_string(),
    }
}

struct MarkdownRules {
    fence: Regex,
    fence_marker: Regex,
    heading: Regex,
    bold: Regex,
    bold_underscore: Regex,
    italic: Regex,
    italic_underscore: Regex,
    bullet: Regex,
    code: Regex,
    blank_runs: Regex,
}

static MARKDOWN: LazyLock<Option<MarkdownRules>> = LazyLock::new(|| {
    Some(MarkdownRules {
        fence: Regex::new(r"(?s)```.*?```").ok()?,
        fence_marker: Regex::new(r"```\w*\n?").ok()?,
        heading: Regex::new(r"(?m)^#{1,6}\s+").ok()?,
        bold: Regex::new(r"\*\*(.+?)\*\*").ok()?,
        bold_underscore: Regex::new(r"__(.+?)__").ok()?,
        italic: Regex::new(r"\*(.+?)\*").ok()?,
        italic_underscore: Regex::new(r"\b_(.+?)_\b").ok()?,
        bullet: Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").ok()?,
        code: Regex::new(r"`(.+?)`").ok()?,
        blank_runs: Regex::new(r"\n{3,}").ok()?,
    })
});

/// Remove Markdown decoration a model may have added to the rewritten
/// prompt, keeping the text itself.
pub fn strip_markdown(text: &str) -> String {
    let Some(rules) = MARKDOWN.as_ref() else {
        return text.trim().to_string();
    };

    let text = rules
        .fence
        .replace_all(text, |caps: &regex::Captures<'_>| {
            rules.fence_marker.replace_all(&caps[0], "").into_owned()
        });
    let text = rules.heading.replace_all(&text, "");
    let text = rules.bold.replace_all(&text, "$1");
    let text = rules.bold_underscore.replace_all(&text, "$1");
    // Bullets before italics so a leading `* ` is not read as emphasis.
    let text = rules.bullet.replace_all(&text, "- ");
    let text = rules.italic.replace_all(&text, "$1");
    let text = rules.italic_underscore.replace_all(&text, "$1");
    let text = rules.code.replace_all(&text, "$1");
    let text = rules.blank_runs.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// The full human-readable report.
pub fn report(result: &AssessmentResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "ASSESSMENT RESULTS");
    let _ = writeln!(out, "Score: {}/100 ({})", result.score, result.grade_label());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", result.assessment_summary);

    section(&mut out, "STRENGTHS", '✓', &result.strengths);
    section(&mut out, "ISSUES", '✗', &result.issues);
    section(&mut out, "MISSING ELEMENTS", '△', &result.missing_elements);

    let _ = writeln!(out);
    let _ = writeln!(out, "SUGGESTIONS");
    if result.suggestions.is_empty() {
        let _ = writeln!(out, "No suggestions returned.");
    }
    for (i, suggestion) in result.suggestions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, suggestion.title);
        if !suggestion.detail.is_empty() {
            let _ = writeln!(out, "   {}", suggestion.detail);
        }
    }

    let optimized = strip_markdown(&result.optimized_version);
    if !optimized.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "OPTIMIZED PROMPT");
        let _ = writeln!(out, "{optimized}");
    }
    if let Some(notes) = &result.optimization_notes {
        let _ = writeln!(out);
        let _ = writeln!(out, "Why: {notes}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "COST ESTIMATE");
    let _ = writeln!(
        out,
        "~{} input tokens, ~{} est. output tokens",
        result.token_count, result.estimated_output_tokens
    );
    out.push_str(&cost_table(&result.cost_estimates.models));

    if !result.cost_estimates.self_hosted_note.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", result.cost_estimates.self_hosted_note);
    }
    out
}

fn section(out: &mut String, title: &str, marker: char, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    for item in items {
        let _ = writeln!(out, "{marker} {item}");
    }
}

/// Cost rows grouped under a header line per provider, in row order.
pub fn cost_table(rows: &[CostRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.model_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Model".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<width$}  {:>10}  {:>10}  {:>10}",
        "Model", "Per run", "Per 100", "Per 1,000"
    );
    let mut last_provider: Option<&str> = None;
    for row in rows {
        if last_provider != Some(row.provider.as_str()) {
            last_provider = Some(row.provider.as_str());
            let _ = writeln!(out, "{}", row.provider);
        }
        let _ = writeln!(
            out,
            "  {:<width$}  {:>10}  {:>10}  {:>10}",
            row.model_name,
            format_cost(row.cost_per_run_usd),
            format_cost(row.cost_per_100_runs_usd),
            format_cost(row.cost_per_1000_runs_usd),
        );
    }
    out
}

/// The catalog as printed by `promptgauge pricing`.
pub fn pricing_table(catalog: &PricingCatalog) -> String {
    let width = catalog
        .entries()
        .iter()
        .map(|e| e.provider.chars().count() + 1 + e.model_name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>12}  {:>12}",
        "Model", "Input/MTok", "Output/MTok"
    );
    for entry in catalog.entries() {
        let _ = writeln!(
            out,
            "{:<width$}  {:>12}  {:>12}",
            format!("{} {}", entry.provider, entry.model_name),
            format!("${:.2}", entry.input_price_per_mtok),
            format!("${:.2}", entry.output_price_per_mtok),
        );
    }
    out
}

/// One line describing a preflight outcome.
pub fn preflight_line(outcome: &PreflightOutcome) -> String {
    match (outcome.ok, &outcome.model_suggestion, &outcome.error) {
        (true, Some(tip), _) => {
            format!("✅ Connected. Tip: {tip} is installed; consider using it for best results.")
        }
        (true, None, _) => "✅ Connected".into(),
        (false, _, Some(error)) => format!("❌ {error}"),
        (false, _, None) => "❌ Preflight check failed".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgauge_core::{CostEstimates, Grade, Suggestion};

    fn row(provider: &str, model: &str, per_run: f64) -> CostRow {
        CostRow {
            provider: provider.into(),
            model_name: model.into(),
            input_price_per_mtok: 1.0,
            output_price_per_mtok: 1.0,
            cost_per_run_usd: per_run,
            cost_per_100_runs_usd: per_run * 100.0,
            cost_per_1000_runs_usd: per_run * 1000.0,
        }
    }

    #[test]
    fn cost_formatting_rules() {
        assert_eq!(format_cost(0.0), "$0.00");
        assert_eq!(format_cost(0.00005), "< $0.0001");
        assert_eq!(format_cost(0.0033), "$0.0033");
        assert_eq!(format_cost(0.00125), "$0.00125");
        assert_eq!(format_cost(0.33), "$0.33");
        assert_eq!(format_cost(0.1), "$0.1");
        assert_eq!(format_cost(3.3), "$3.30");
        assert_eq!(format_cost(1234.567), "$1234.57");
    }

    #[test]
    fn strips_markdown() {
        let raw = "## Role\nYou are a **senior** editor.\n\n\n\n* Keep it _short_\n+ Use `bullets`";
        assert_eq!(
            strip_markdown(raw),
            "Role\nYou are a senior editor.\n\n- Keep it short\n- Use bullets"
        );
    }

    #[test]
    fn strips_code_fences_but_keeps_content() {
        let raw = "Use this format:\n```json\n{\"a\": 1}\n```";
        assert_eq!(strip_markdown(raw), "Use this format:\n{\"a\": 1}");
    }

    #[test]
    fn snake_case_identifiers_survive() {
        assert_eq!(strip_markdown("Return user_id and order_total."), "Return user_id and order_total.");
    }

    #[test]
    fn table_groups_by_provider() {
        let table = cost_table(&[
            row("Anthropic", "Claude Opus 4.6", 0.0165),
            row("Anthropic", "Claude Sonnet 4.6", 0.0033),
            row("OpenAI", "GPT-4o", 0.0023),
        ]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[1], "Anthropic");
        assert!(lines[2].contains("Claude Opus 4.6"));
        assert!(lines[3].contains("$0.0033"));
        assert_eq!(lines[4], "OpenAI");
        assert_eq!(table.matches("Anthropic").count(), 1);
    }

    #[test]
    fn report_sections() {
        let result = AssessmentResult {
            score: 140,
            grade: None,
            assessment_summary: "Clear but unbounded.".into(),
            strengths: vec!["Names the audience".into()],
            issues: vec![],
            missing_elements: vec!["Output length".into()],
            suggestions: vec![Suggestion {
                title: "Bound the length".into(),
                detail: "Ask for at most 200 words.".into(),
            }],
            optimized_version: "**Write** a summary.".into(),
            token_count: 12,
            estimated_output_tokens: 300,
            cost_estimates: CostEstimates {
                models: vec![row("OpenAI", "GPT-4o", 0.0)],
                self_hosted_note: "Self-hosted: cheap.".into(),
            },
            optimization_notes: None,
        };
        let text = report(&result);
        assert!(text.contains("Score: 140/100 (?)"));
        assert!(text.contains("✓ Names the audience"));
        assert!(!text.contains("ISSUES"));
        assert!(text.contains("△ Output length"));
        assert!(text.contains("1. Bound the length"));
        assert!(text.contains("OPTIMIZED PROMPT\nWrite a summary."));
        assert!(text.contains("$0.00"));
        assert!(text.ends_with("Self-hosted: cheap.\n"));

        let graded = AssessmentResult {
            grade: Some(Grade::BPlus),
            score: 88,
            ..result
        };
        assert!(report(&graded).contains("Score: 88/100 (B+)"));
    }

    #[test]
    fn pricing_in_catalog_order() {
        let table = pricing_table(&PricingCatalog::builtin());
        let opus = table.find("Claude Opus 4.6").unwrap();
        let llama = table.find("Llama 3.3 70B").unwrap();
        assert!(opus < llama);
        assert!(table.contains("$15.00"));
    }

    #[test]
    fn preflight_lines() {
        assert_eq!(preflight_line(&PreflightOutcome::ready()), "✅ Connected");
        assert!(preflight_line(&PreflightOutcome::ready_with_suggestion("gpt-oss:20b")).contains("gpt-oss:20b"));
        assert_eq!(preflight_line(&PreflightOutcome::failed("nope")), "❌ nope");
    }
}
