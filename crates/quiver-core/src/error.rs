//! Error types for quiver-core.

use thiserror::Error;

/// Failure while coercing decoded property values to their schema-declared
/// types.
///
/// Produced by [`crate::traits::SchemaEnricher`] implementations. The codec
/// wraps it and bubbles it up to the caller unchanged.
#[derive(Debug, Error)]
#[error("schema enrichment failed: {0}")]
pub struct EnrichmentError(pub String);

impl EnrichmentError {
    /// Create an enrichment error from any displayable cause.
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}
