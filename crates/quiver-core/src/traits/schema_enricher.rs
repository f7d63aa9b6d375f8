//! Schema-driven property enrichment.
//!
//! The binary codec stores properties as schemaless JSON. The schema registry
//! knows the declared data type of every property (integer widths, dates,
//! references) and is responsible for coercing the generic JSON values into
//! those types after decoding. That registry lives outside this workspace, so
//! the contract is expressed as a trait.

use serde_json::{Map, Value};

use crate::error::EnrichmentError;

/// Post-decode coercion of property values to their schema-declared types.
///
/// Implementations consult the schema registry for each property's declared
/// data type and rewrite the value in place, e.g. turning a JSON number into
/// the precise numeric type the schema declares, or structuring reference
/// values. Decoders invoke this exactly once per materialized object.
pub trait SchemaEnricher: Send + Sync {
    /// Coerce `properties` in place.
    ///
    /// `by_reference` signals that the properties were resolved through a
    /// reference lookup rather than read directly from the object's own
    /// class, which changes how reference values are structured.
    fn enrich(
        &self,
        properties: &mut Map<String, Value>,
        by_reference: bool,
    ) -> Result<(), EnrichmentError>;
}

/// Enricher that leaves properties untouched.
///
/// For callers that operate without a schema registry, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEnricher;

impl SchemaEnricher for PassthroughEnricher {
    fn enrich(
        &self,
        _properties: &mut Map<String, Value>,
        _by_reference: bool,
    ) -> Result<(), EnrichmentError> {
        Ok(())
    }
}
