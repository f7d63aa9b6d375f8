//! Projection of stored objects into search-result envelopes.

use serde_json::{Map, Value};
use uuid::Uuid;

use super::additional::{Additional, EXPLAIN_SCORE_KEY};
use super::object::{StoredObject, Vectors};
use super::projection::FieldMask;

/// Map a raw vector distance onto a certainty in `[0, 1]`.
///
/// The mapping is monotonic: distance 0 is full certainty, distance 2 (the
/// cosine-distance maximum) is none.
pub fn dist_to_certainty(dist: f64) -> f64 {
    1.0 - dist / 2.0
}

/// A single search hit as surfaced to the query layer.
///
/// A shallow projection of a [`StoredObject`]: identity, class, timestamps,
/// vectors, the mask-filtered properties, and whichever `additional` subtrees
/// the caller's module flags requested. `score`, `dist`, and `certainty` are
/// filled by the ranking stage that produced the hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub id: Uuid,
    pub doc_id: Option<u64>,
    pub class_name: String,
    pub properties: Map<String, Value>,
    pub vector: Vec<f32>,
    pub vectors: Vectors,
    /// Primary-vector dimension count, available even when the vector body
    /// was skipped during decode.
    pub dims: usize,
    pub created: i64,
    pub updated: i64,
    pub additional: Additional,
    pub dist: Option<f32>,
    pub certainty: Option<f32>,
    pub score: Option<f32>,
    pub explain_score: Option<String>,
    pub is_consistent: bool,
    /// Never part of the binary representation.
    pub tenant: String,
}

impl StoredObject {
    /// Project this object into a search-result envelope.
    ///
    /// Properties are filtered per the mask (see
    /// [`StoredObject::properties_with_additional`]) and the object's UUID is
    /// injected into them under `id`. Of the stored `additional` subtrees,
    /// only the ones the mask's module flags request are copied through.
    pub fn to_search_result(&self, mask: &FieldMask, tenant: &str) -> SearchResult {
        let mut properties = self.properties_with_additional(mask).unwrap_or_default();
        properties.insert("id".to_string(), Value::String(self.id.to_string()));

        let mut additional = Additional::default();
        if let Some(stored) = &self.additional {
            if mask.interpretation() {
                if let Some(interpretation) = stored.extra.get("interpretation") {
                    additional
                        .extra
                        .insert("interpretation".to_string(), interpretation.clone());
                }
            }
            if mask.classification {
                additional.classification = stored.classification.clone();
            }
            if mask.group {
                additional.group = stored.group.clone();
            }
        }

        let explain_score = self.explain_score().map(str::to_string);
        if let Some(explain) = &explain_score {
            additional
                .extra
                .insert(EXPLAIN_SCORE_KEY.to_string(), Value::String(explain.clone()));
        }

        SearchResult {
            id: self.id,
            doc_id: Some(self.doc_id),
            class_name: self.class.clone(),
            properties,
            vector: self.vector.clone(),
            vectors: self.vectors.clone(),
            dims: self.vector_len,
            created: self.creation_time_unix,
            updated: self.last_update_time_unix,
            additional,
            dist: None,
            certainty: None,
            score: None,
            explain_score,
            is_consistent: self.is_consistent,
            tenant: tenant.to_string(),
        }
    }

    /// Envelope with the hit's distance and the derived certainty filled in.
    pub fn to_search_result_with_dist(&self, mask: &FieldMask, dist: f32) -> SearchResult {
        let mut result = self.to_search_result(mask, "");
        result.dist = Some(dist);
        result.certainty = Some(dist_to_certainty(f64::from(dist)) as f32);
        result
    }

    /// Envelope with the hit's score filled in.
    pub fn to_search_result_with_score(&self, mask: &FieldMask, score: f32) -> SearchResult {
        let mut result = self.to_search_result(mask, "");
        result.score = Some(score);
        result
    }
}

/// Project a batch of objects.
pub fn search_results(objects: &[StoredObject], mask: &FieldMask, tenant: &str) -> Vec<SearchResult> {
    objects
        .iter()
        .map(|object| object.to_search_result(mask, tenant))
        .collect()
}

/// Project a batch of objects with per-position scores.
///
/// Positions past the end of `scores` fall back to a score of zero.
pub fn search_results_with_scores(
    objects: &[StoredObject],
    scores: &[f32],
    mask: &FieldMask,
    tenant: &str,
) -> Vec<SearchResult> {
    objects
        .iter()
        .enumerate()
        .map(|(i, object)| {
            let mut result = object.to_search_result_with_score(mask, scores.get(i).copied().unwrap_or(0.0));
            result.tenant = tenant.to_string();
            result
        })
        .collect()
}

/// Project a batch of objects with per-position distances.
pub fn search_results_with_dists(
    objects: &[StoredObject],
    dists: &[f32],
    mask: &FieldMask,
) -> Vec<SearchResult> {
    objects
        .iter()
        .zip(dists)
        .map(|(object, dist)| object.to_search_result_with_dist(mask, *dist))
        .collect()
}
