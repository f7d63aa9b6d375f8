//! Entity types shared across the storage layer.

mod additional;
mod object;
mod projection;
mod search_result;

pub use additional::{
    Additional, Classification, Group, GroupHit, GroupHitAdditional, GroupedBy, EXPLAIN_SCORE_KEY,
};
pub use object::{assign_ownership, StoredObject, Vectors, MARSHALLER_VERSION};
pub use projection::{FieldMask, PropertyProjection};
pub use search_result::{
    dist_to_certainty, search_results, search_results_with_dists, search_results_with_scores,
    SearchResult,
};
