//! The promptgauge assessment engine.
//!
//! [`Orchestrator::run_assessment`] is the single entry point: it validates
//! a request, runs the preflight gate where the mode needs one, compiles the
//! instruction prompt, dispatches it through the selected backend and
//! normalizes the reply into an `AssessmentResult`.

pub mod compiler;
pub mod narration;
pub mod normalizer;
pub mod orchestrator;

pub use compiler::compile;
pub use narration::{DelayedNote, NarrationSchedule};
pub use normalizer::normalize;
pub use orchestrator::Orchestrator;
