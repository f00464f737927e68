//! Pricing catalog and cost projection for promptgauge.
//!
//! The catalog is a fixed, ordered table of per-million-token prices. Its
//! order is the report order. Costs are always derived here from the
//! catalog, never taken from a backend's own arithmetic.

pub mod catalog;
pub mod cost;

pub use catalog::{PricingCatalog, PricingEntry};
pub use cost::{cost_rows, self_hosted_note};

/// Errors from building a catalog.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("catalog is empty")]
    Empty,

    #[error("invalid price for {provider} {model_name}: {reason}")]
    InvalidPrice {
        provider: String,
        model_name: String,
        reason: String,
    },
}
