//! Entity model for the quiver storage layer.
//!
//! This crate defines the stored-object model and everything the query layer
//! needs to consume it: typed `additional` subtrees, field masks and property
//! projections for partial reads, the search-result envelope, and the
//! schema-enrichment trait boundary. The binary codec that persists these
//! types lives in `quiver-storage`.

pub mod error;
pub mod traits;
pub mod types;

pub use error::EnrichmentError;
pub use traits::{PassthroughEnricher, SchemaEnricher};
pub use types::{
    assign_ownership, dist_to_certainty, search_results, search_results_with_dists,
    search_results_with_scores, Additional, Classification, FieldMask, Group, GroupHit,
    GroupHitAdditional, GroupedBy, PropertyProjection, SearchResult, StoredObject, Vectors,
    EXPLAIN_SCORE_KEY, MARSHALLER_VERSION,
};
