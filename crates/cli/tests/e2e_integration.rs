//! End-to-end tests for the assessment pipeline.
//!
//! These wire the same pieces the CLI wires (config file, router,
//! preflight, orchestrator) against wiremock servers standing in for
//! Ollama and the managed gateway.

use std::sync::Arc;
use std::time::Duration;

use promptgauge_config::{AppConfig, RequestOverrides};
use promptgauge_core::{AssessError, Grade, ProviderMode, Stage};
use promptgauge_engine::{NarrationSchedule, Orchestrator};
use promptgauge_providers::{BackendRouter, GatewaySession, HttpPreflight};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn assessment_json() -> String {
    json!({
        "score": 84,
        "grade": "B",
        "assessment_summary": "A clear task with **some** missing constraints.",
        "strengths": ["Specific task", "Names the audience"],
        "issues": ["No output format"],
        "missing_elements": ["Length limit"],
        "suggestions": [
            { "title": "Set a format", "detail": "Ask for a bulleted list." }
        ],
        "optimized_version": "Write a 3-bullet summary of the report for executives.",
        "token_count": 1000,
        "estimated_output_tokens": 500
    })
    .to_string()
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> AppConfig {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    AppConfig::load_from(&path).unwrap()
}

fn orchestrator(config: &AppConfig, router: BackendRouter) -> Orchestrator {
    Orchestrator::new(
        Arc::new(config.catalog().unwrap()),
        Arc::new(router),
        Arc::new(HttpPreflight::new(Duration::from_secs(
            config.http.preflight_timeout_secs,
        ))),
    )
    .with_narration(NarrationSchedule::silent())
}

async fn ollama_server(installed: &[&str], reply: String) -> MockServer {
    let server = MockServer::start().await;
    let models: Vec<_> = installed.iter().map(|n| json!({ "name": n })).collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "model": "llama3.2", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "message": { "role": "assistant", "content": reply },
            "done": true
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn ollama_assessment_from_config_file() {
    let server = ollama_server(&["llama3.2:latest"], assessment_json()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &format!(
            "mode = \"ollama\"\nollama_url = \"{}\"\nollama_model = \"llama3.2\"\n\n[narration]\nenabled = false\n",
            server.uri()
        ),
    );

    let request = config
        .resolve_request(
            "Summarise the report.",
            Some("Internal exec briefing".into()),
            &RequestOverrides::default(),
        )
        .unwrap();
    assert_eq!(request.mode(), ProviderMode::LocalDaemon);

    let orchestrator = orchestrator(&config, BackendRouter::new(Duration::from_secs(5)));
    let mut updates = orchestrator.status_bus().subscribe();

    let result = orchestrator.run_assessment(request).await.unwrap();
    assert_eq!(result.score, 84);
    assert_eq!(result.grade, Some(Grade::B));
    assert_eq!(result.token_count, 1000);
    assert_eq!(
        result.cost_estimates.models.len(),
        config.catalog().unwrap().len()
    );
    assert!(!result.cost_estimates.self_hosted_note.is_empty());

    let mut stages = Vec::new();
    while let Ok(update) = updates.try_recv() {
        stages.push(update.stage);
    }
    assert_eq!(stages.last(), Some(&Stage::Done));
    assert!(stages.contains(&Stage::Preflighting));
    assert!(stages.contains(&Stage::Compiling));
}

#[tokio::test]
async fn fenced_reply_is_still_normalized() {
    let fenced = format!("```json\n{}\n```", assessment_json());
    let server = ollama_server(&["llama3.2"], fenced).await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &format!("mode = \"ollama\"\nollama_url = \"{}\"\n", server.uri()));

    let request = config
        .resolve_request("Write a haiku", None, &RequestOverrides::default())
        .unwrap();
    let result = orchestrator(&config, BackendRouter::default())
        .run_assessment(request)
        .await
        .unwrap();
    assert_eq!(result.suggestions[0].title, "Set a format");
}

#[tokio::test]
async fn missing_ollama_model_stops_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "models": [{ "name": "mistral:7b" }] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &format!("mode = \"ollama\"\nollama_url = \"{}\"\n", server.uri()));
    let request = config
        .resolve_request("Write a haiku", None, &RequestOverrides::default())
        .unwrap();

    let err = orchestrator(&config, BackendRouter::default())
        .run_assessment(request)
        .await
        .unwrap_err();
    assert!(matches!(err, AssessError::Preflight { .. }));
    assert!(err.to_string().contains("ollama pull llama3.2"));
}

#[tokio::test]
async fn unparseable_reply_is_a_parse_error() {
    let server = ollama_server(&["llama3.2"], "I think this prompt is great!".into()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &format!("mode = \"ollama\"\nollama_url = \"{}\"\n", server.uri()));
    let request = config
        .resolve_request("Write a haiku", None, &RequestOverrides::default())
        .unwrap();

    let err = orchestrator(&config, BackendRouter::default())
        .run_assessment(request)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}

#[tokio::test]
async fn signed_out_managed_session_signals_fallback() {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "mode = \"managed\"\n");
    let request = config
        .resolve_request("Write a haiku", None, &RequestOverrides::default())
        .unwrap();

    let router = BackendRouter::new(Duration::from_secs(5))
        .with_session(Arc::new(GatewaySession::new(gateway.uri(), None)));
    let err = orchestrator(&config, router)
        .run_assessment(request)
        .await
        .unwrap_err();
    assert!(err.offers_mode_switch());
    assert_eq!(err.suggested_mode(), Some(ProviderMode::LocalDaemon));
}

#[tokio::test]
async fn keyed_cloud_without_key_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "mode = \"anthropic\"\n");
    let request = config
        .resolve_request("Write a haiku", None, &RequestOverrides::default())
        .unwrap();

    let err = orchestrator(&config, BackendRouter::default())
        .run_assessment(request)
        .await
        .unwrap_err();
    assert!(matches!(err, AssessError::Validation(_)));
}

#[tokio::test]
async fn flag_overrides_beat_the_config_file() {
    let server = ollama_server(&["llama3.2"], assessment_json()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "mode = \"managed\"\n");
    let overrides = RequestOverrides {
        mode: Some(ProviderMode::LocalDaemon),
        base_url: Some(server.uri()),
        ..Default::default()
    };

    let request = config.resolve_request("Write a haiku", None, &overrides).unwrap();
    let result = orchestrator(&config, BackendRouter::default())
        .run_assessment(request)
        .await
        .unwrap();
    assert_eq!(result.score, 84);
}
