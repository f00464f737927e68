//! # promptgauge core
//!
//! Domain types, traits, and error definitions for promptgauge, the prompt
//! assessment and cost projection tool. This crate has no networking
//! dependencies; it defines the model every other crate implements
//! against.
//!
//! ## Design Philosophy
//!
//! Each seam the orchestrator talks through is a trait here
//! ([`Backend`], [`BackendFactory`], [`Preflight`]). Implementations live in
//! `promptgauge-providers`. This enables:
//! - Swapping backends per request via [`ModeConfig`]
//! - Testing the orchestrator with mock backends
//! - A clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod message;
pub mod request;
pub mod result;
pub mod status;

// Re-export key types at crate root for ergonomics
pub use backend::{Backend, BackendFactory, Preflight, PreflightOutcome};
pub use error::{AssessError, ParseError, ProviderError, Result};
pub use message::{ChatMessage, CompiledPrompt, Role};
pub use request::{AssessmentRequest, CloudProvider, ModeConfig, ProviderMode};
pub use result::{AssessmentResult, CostEstimates, CostRow, Grade, Suggestion};
pub use status::{Stage, StatusBus, StatusUpdate};
