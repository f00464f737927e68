//! Result normalizer: turns a backend's raw text into an [`AssessmentResult`].
//!
//! Cost rows are always recomputed from the catalog. Any cost figures the
//! backend returned are ignored, so displayed costs stay catalog-consistent
//! even when the model's arithmetic is wrong.

use promptgauge_core::error::ParseError;
use promptgauge_core::result::{AssessmentResult, CostEstimates, Grade, Suggestion};
use promptgauge_pricing::{cost_rows, self_hosted_note, PricingCatalog};
use serde_json::{Map, Value};

/// Validate and normalize one backend response.
pub fn normalize(raw: &str, catalog: &PricingCatalog) -> Result<AssessmentResult, ParseError> {
    let value: Value = serde_json::from_str(strip_fence(raw))
        .map_err(|e| ParseError::MalformedJson(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(ParseError::NotAnObject(json_kind(&value)));
    };

    let score = required_score(&obj)?;
    let assessment_summary = match obj.get("assessment_summary") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => return Err(ParseError::MissingField("assessment_summary")),
        Some(other) => {
            return Err(ParseError::InvalidField {
                field: "assessment_summary",
                reason: format!("expected a string, found {}", json_kind(other)),
            });
        }
    };

    let grade = obj
        .get("grade")
        .and_then(Value::as_str)
        .and_then(|g| g.parse::<Grade>().ok())
        .or_else(|| Grade::from_score(score));

    let token_count = token_field(&obj, "token_count")?;
    let estimated_output_tokens = token_field(&obj, "estimated_output_tokens")?;

    let backend_note = obj
        .get("cost_estimates")
        .and_then(|c| c.get("self_hosted_note"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(AssessmentResult {
        score,
        grade,
        assessment_summary,
        strengths: string_list(&obj, "strengths"),
        issues: string_list(&obj, "issues"),
        missing_elements: string_list(&obj, "missing_elements"),
        suggestions: suggestions(&obj),
        optimized_version: obj
            .get("optimized_version")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        token_count,
        estimated_output_tokens,
        cost_estimates: CostEstimates {
            models: cost_rows(catalog, token_count, estimated_output_tokens),
            self_hosted_note: backend_note
                .unwrap_or_else(|| self_hosted_note(token_count, estimated_output_tokens)),
        },
        optimization_notes: obj
            .get("optimization_notes")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    })
}

/// Remove one enclosing Markdown code fence, if present.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with('{') => inner.trim(),
        _ => body.trim(),
    }
}

fn required_score(obj: &Map<String, Value>) -> Result<i64, ParseError> {
    let value = match obj.get("score") {
        None | Some(Value::Null) => return Err(ParseError::MissingField("score")),
        Some(v) => v,
    };
    integral(value).ok_or_else(|| ParseError::InvalidField {
        field: "score",
        reason: format!("expected an integer, found {value}"),
    })
}

fn token_field(obj: &Map<String, Value>, field: &'static str) -> Result<u64, ParseError> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => return Ok(0),
        Some(v) => v,
    };
    integral(value)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| ParseError::InvalidField {
            field,
            reason: format!("expected a non-negative integer, found {value}"),
        })
}

/// An integer, or a float with no fractional part.
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn string_list(obj: &Map<String, Value>, field: &str) -> Vec<String> {
    match obj.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn suggestions(obj: &Map<String, Value>) -> Vec<Suggestion> {
    let Some(Value::Array(items)) = obj.get("suggestions") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(detail) => Some(Suggestion {
                title: "Suggestion".into(),
                detail: detail.clone(),
            }),
            Value::Object(fields) => {
                let title = fields
                    .get("title")
                    .and_then(Value::as_str)
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or("Suggestion");
                let detail = fields.get("detail").and_then(Value::as_str).unwrap_or_default();
                Some(Suggestion {
                    title: title.to_string(),
                    detail: detail.to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgauge_pricing::PricingEntry;

    fn sonnet_only() -> PricingCatalog {
        PricingCatalog::new(vec![PricingEntry::new("Anthropic", "Claude Sonnet 4.6", 3.0, 15.0)])
            .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
    }

    #[test]
    fn minimal_response_with_recomputed_costs() {
        let raw = r#"{"score":88,"grade":"B+","assessment_summary":"ok","token_count":100,"estimated_output_tokens":200}"#;
        let result = normalize(raw, &sonnet_only()).unwrap();

        assert_eq!(result.score, 88);
        assert_eq!(result.grade, Some(Grade::BPlus));
        assert_eq!(result.assessment_summary, "ok");
        assert!(result.strengths.is_empty());
        assert!(result.suggestions.is_empty());

        let row = &result.cost_estimates.models[0];
        assert_eq!(result.cost_estimates.models.len(), 1);
        assert!(approx(row.cost_per_run_usd, 0.0033));
        assert!(approx(row.cost_per_100_runs_usd, 0.33));
        assert!(approx(row.cost_per_1000_runs_usd, 3.3));
        assert!(result.cost_estimates.self_hosted_note.contains("300 tokens"));
    }

    #[test]
    fn backend_costs_are_ignored() {
        let raw = r#"{
            "score": 70, "assessment_summary": "s", "token_count": 100, "estimated_output_tokens": 200,
            "cost_estimates": {
                "models": [{"provider":"Anthropic","model_name":"Claude Sonnet 4.6","cost_per_run_usd":99.0}],
                "self_hosted_note": "run it on a toaster"
            }
        }"#;
        let result = normalize(raw, &sonnet_only()).unwrap();
        assert!(approx(result.cost_estimates.models[0].cost_per_run_usd, 0.0033));
        assert_eq!(result.cost_estimates.self_hosted_note, "run it on a toaster");
    }

    #[test]
    fn catalog_order_wins_over_response_order() {
        let raw = r#"{"score":50,"assessment_summary":"s","token_count":10,"estimated_output_tokens":10,
            "cost_estimates":{"models":[{"model_name":"Llama 3.3 70B"},{"model_name":"Claude Opus 4.6"}]}}"#;
        let catalog = PricingCatalog::builtin();
        let result = normalize(raw, &catalog).unwrap();
        let got: Vec<_> = result.cost_estimates.models.iter().map(|r| &r.model_name).collect();
        let want: Vec<_> = catalog.entries().iter().map(|e| &e.model_name).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn non_json_is_malformed() {
        let err = normalize("I think this prompt is great!", &sonnet_only()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson(_)));
        assert!(!err.is_incomplete());
    }

    #[test]
    fn array_is_not_an_object() {
        let err = normalize("[1,2,3]", &sonnet_only()).unwrap_err();
        assert_eq!(err, ParseError::NotAnObject("array"));
    }

    #[test]
    fn missing_score_is_incomplete() {
        let err = normalize(r#"{"assessment_summary":"s"}"#, &sonnet_only()).unwrap_err();
        assert_eq!(err, ParseError::MissingField("score"));
        assert!(err.is_incomplete());
    }

    #[test]
    fn missing_summary_is_incomplete() {
        let err = normalize(r#"{"score":80}"#, &sonnet_only()).unwrap_err();
        assert_eq!(err, ParseError::MissingField("assessment_summary"));
    }

    #[test]
    fn fractional_score_is_invalid() {
        let err = normalize(r#"{"score":88.5,"assessment_summary":"s"}"#, &sonnet_only()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "score", .. }));
        let ok = normalize(r#"{"score":88.0,"assessment_summary":"s"}"#, &sonnet_only()).unwrap();
        assert_eq!(ok.score, 88);
    }

    #[test]
    fn missing_token_counts_default_to_zero() {
        let result = normalize(r#"{"score":40,"assessment_summary":"s","token_count":null}"#, &sonnet_only())
            .unwrap();
        assert_eq!(result.token_count, 0);
        assert_eq!(result.estimated_output_tokens, 0);
        assert_eq!(result.cost_estimates.models[0].cost_per_run_usd, 0.0);
    }

    #[test]
    fn negative_tokens_are_invalid() {
        let err = normalize(r#"{"score":40,"assessment_summary":"s","token_count":-5}"#, &sonnet_only())
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "token_count", .. }));
    }

    #[test]
    fn grade_falls_back_to_score() {
        let result = normalize(r#"{"score":95,"grade":"excellent","assessment_summary":"s"}"#, &sonnet_only())
            .unwrap();
        assert_eq!(result.grade, Some(Grade::A));

        let out_of_range = normalize(r#"{"score":140,"assessment_summary":"s"}"#, &sonnet_only()).unwrap();
        assert_eq!(out_of_range.score, 140);
        assert_eq!(out_of_range.grade, None);
        assert_eq!(out_of_range.grade_label(), "?");
    }

    #[test]
    fn backend_grade_is_kept_even_if_inconsistent() {
        let result = normalize(r#"{"score":50,"grade":"a-","assessment_summary":"s"}"#, &sonnet_only())
            .unwrap();
        assert_eq!(result.grade, Some(Grade::AMinus));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"score\":77,\"assessment_summary\":\"s\"}\n```";
        assert_eq!(normalize(raw, &sonnet_only()).unwrap().score, 77);
        let bare = "```\n{\"score\":77,\"assessment_summary\":\"s\"}\n```";
        assert_eq!(normalize(bare, &sonnet_only()).unwrap().score, 77);
    }

    #[test]
    fn prose_around_json_is_malformed() {
        let raw = "Here you go: {\"score\":77,\"assessment_summary\":\"s\"}";
        assert!(matches!(normalize(raw, &sonnet_only()), Err(ParseError::MalformedJson(_))));
    }

    #[test]
    fn lists_and_suggestions_are_lenient() {
        let raw = r#"{
            "score": 81, "assessment_summary": "s",
            "strengths": ["clear goal", 42, null, "good tone"],
            "issues": "only one issue",
            "missing_elements": {"not": "a list"},
            "suggestions": [
                {"title": "Add examples", "detail": "Include two examples."},
                {"detail": "Specify length."},
                "Use bullet points.",
                7
            ],
            "optimized_version": "Better prompt",
            "optimization_notes": "  "
        }"#;
        let result = normalize(raw, &sonnet_only()).unwrap();
        assert_eq!(result.strengths, vec!["clear goal", "good tone"]);
        assert_eq!(result.issues, vec!["only one issue"]);
        assert!(result.missing_elements.is_empty());
        assert_eq!(result.suggestions.len(), 3);
        assert_eq!(result.suggestions[0].title, "Add examples");
        assert_eq!(result.suggestions[1].title, "Suggestion");
        assert_eq!(result.suggestions[2].detail, "Use bullet points.");
        assert_eq!(result.optimized_version, "Better prompt");
        assert!(result.optimization_notes.is_none());
    }
}
