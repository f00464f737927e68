//! The assessment orchestrator.
//!
//! Sequences one run through its stages:
//!
//! ```text
//! Idle → Validating → (Preflighting) → Compiling → Dispatching → Normalizing → Done
//!                              │                        │              │
//!                              └──────── Failed ◄───────┴──────────────┘
//!                                                       └─► Fallback (managed only)
//! ```
//!
//! Every step is awaited sequentially and nothing is retried. The only
//! resilience is the single preflight gate for the local daemon and custom
//! endpoints, and the fallback signal raised when the managed session fails.

use std::sync::Arc;

use promptgauge_core::backend::{BackendFactory, Preflight};
use promptgauge_core::error::{AssessError, ProviderError};
use promptgauge_core::request::{AssessmentRequest, ProviderMode};
use promptgauge_core::result::AssessmentResult;
use promptgauge_core::status::{Stage, StatusBus, StatusUpdate};
use promptgauge_pricing::PricingCatalog;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::compiler::compile;
use crate::narration::{self, NarrationSchedule};
use crate::normalizer::normalize;

/// Runs assessments against whichever backend each request selects.
///
/// One logical request at a time: callers must not submit a second request
/// before the first returns.
pub struct Orchestrator {
    catalog: Arc<PricingCatalog>,
    factory: Arc<dyn BackendFactory>,
    preflight: Arc<dyn Preflight>,
    status: StatusBus,
    narration: NarrationSchedule,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<PricingCatalog>,
        factory: Arc<dyn BackendFactory>,
        preflight: Arc<dyn Preflight>,
    ) -> Self {
        Self {
            catalog,
            factory,
            preflight,
            status: StatusBus::default(),
            narration: NarrationSchedule::default(),
        }
    }

    /// Replace the delayed notes published during dispatch.
    pub fn with_narration(mut self, schedule: NarrationSchedule) -> Self {
        self.narration = schedule;
        self
    }

    pub fn status_bus(&self) -> &StatusBus {
        &self.status
    }

    /// Assess one prompt.
    pub async fn run_assessment(
        &self,
        request: AssessmentRequest,
    ) -> Result<AssessmentResult, AssessError> {
        let mode = request.mode();
        let span = info_span!("assessment", id = %Uuid::new_v4(), mode = %mode);
        let (stage_tx, stage_rx) = watch::channel(Stage::Idle);

        let outcome = self
            .run_stages(&request, &stage_tx, stage_rx)
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        match &outcome {
            Ok(result) => {
                self.advance(&stage_tx, Stage::Done, "Done", format!("Score {}", result.score));
                info!(score = result.score, grade = result.grade_label(), "Assessment complete");
            }
            Err(e @ AssessError::Fallback { .. }) => {
                self.advance(&stage_tx, Stage::Fallback, "Managed session unavailable", e.to_string());
                warn!(error = %e, "Managed session failed, offering local daemon");
            }
            Err(e) => {
                self.advance(&stage_tx, Stage::Failed, "Assessment failed", e.to_string());
                warn!(kind = e.kind(), error = %e, "Assessment failed");
            }
        }
        outcome
    }

    async fn run_stages(
        &self,
        request: &AssessmentRequest,
        stage_tx: &watch::Sender<Stage>,
        stage_rx: watch::Receiver<Stage>,
    ) -> Result<AssessmentResult, AssessError> {
        let mode = request.mode();

        self.advance(stage_tx, Stage::Validating, "Validating...", "");
        request.validate()?;

        if mode.needs_preflight() {
            self.advance(
                stage_tx,
                Stage::Preflighting,
                "Checking connection...",
                format!("Verifying {} is reachable", target_label(mode)),
            );
            let check = self.preflight.check(&request.config).await;
            if !check.ok {
                let message = check
                    .error
                    .unwrap_or_else(|| format!("{} is not reachable", target_label(mode)));
                return Err(AssessError::Preflight { message });
            }

            match (&check.model_suggestion, mode) {
                (Some(tip), ProviderMode::LocalDaemon) => {
                    info!(suggestion = %tip, configured = request.config.effective_model(), "Preflight suggests another model");
                    self.publish(
                        Stage::Preflighting,
                        "Connected to Ollama",
                        format!("Tip: You have {tip} installed. Consider using it for best results"),
                    );
                }
                _ => self.publish(
                    Stage::Preflighting,
                    "Connected",
                    "Model verified, building assessment request",
                ),
            }
        }

        self.advance(
            stage_tx,
            Stage::Compiling,
            "Analyzing your prompt...",
            format!("Building assessment for {}", mode.display_name()),
        );
        let compiled = compile(request.prompt_text(), request.context_text(), &self.catalog);
        let backend = self.factory.backend_for(&request.config);

        stage_tx.send_replace(Stage::Dispatching);
        debug!(stage = %Stage::Dispatching, backend = backend.name(), model = backend.model(), "Stage transition");
        let mut narrator = narration::spawn(&self.narration, self.status.clone(), stage_rx);
        let dispatched = backend.dispatch(&compiled).await;
        stage_tx.send_replace(Stage::Normalizing);
        narrator.cancel();

        let raw = dispatched.map_err(|source| classify_dispatch(mode, backend.name(), source))?;

        debug!(stage = %Stage::Normalizing, bytes = raw.len(), "Stage transition");
        Ok(normalize(&raw, &self.catalog)?)
    }

    fn advance(
        &self,
        stage_tx: &watch::Sender<Stage>,
        stage: Stage,
        headline: &str,
        detail: impl Into<String>,
    ) {
        stage_tx.send_replace(stage);
        debug!(stage = %stage, "Stage transition");
        self.publish(stage, headline, detail);
    }

    fn publish(&self, stage: Stage, headline: &str, detail: impl Into<String>) {
        self.status.publish(StatusUpdate::new(stage, headline, detail));
    }
}

/// Managed-session failures become the fallback signal; everything else is a
/// plain dispatch error.
fn classify_dispatch(mode: ProviderMode, backend: &str, source: ProviderError) -> AssessError {
    if mode == ProviderMode::Managed && source.is_recoverable() {
        let reason = match source {
            ProviderError::SessionUnavailable(reason) => reason,
            other => other.to_string(),
        };
        return AssessError::Fallback { reason };
    }
    AssessError::Dispatch {
        backend: backend.to_string(),
        source,
    }
}

fn target_label(mode: ProviderMode) -> &'static str {
    match mode {
        ProviderMode::LocalDaemon => "Ollama",
        _ => "endpoint",
    }
}
