//! Trait boundaries between the entity model and its external collaborators.

mod schema_enricher;

pub use schema_enricher::{PassthroughEnricher, SchemaEnricher};
