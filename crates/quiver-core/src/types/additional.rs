//! Runtime metadata stored alongside an object.
//!
//! The `additional` region of the frame is a JSON mapping with two well-known
//! subtrees that are re-cast into typed form after decoding: `classification`
//! and `group`. Everything else (`interpretation`, `explainScore`, module
//! output) stays generic. `group.hits[i]._additional` nests one more typed
//! level; in practice two levels is as deep as the recursion goes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Key under which a stored explain score lives in [`Additional::extra`].
pub const EXPLAIN_SCORE_KEY: &str = "explainScore";

/// Typed view of the `additional` mapping.
///
/// The two well-known subtrees deserialize into typed structs; every other
/// key is preserved verbatim in `extra` so unknown module output survives a
/// round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Additional {
    /// Classification metadata written by the classifier module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    /// Group metadata written by the group-by module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,

    /// All remaining keys, untyped.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Additional {
    /// True when no metadata of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.classification.is_none() && self.group.is_none() && self.extra.is_empty()
    }

    /// The stored explain score, if one was persisted.
    pub fn explain_score(&self) -> Option<&str> {
        self.extra.get(EXPLAIN_SCORE_KEY).and_then(Value::as_str)
    }
}

/// Classification outcome attached to an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Property names the classification was based on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub based_on: Vec<String>,

    /// Property names that received classified values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classified_fields: Vec<String>,

    /// Completion timestamp as an RFC 3339 string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
}

/// Result of a group-by aggregation that this object belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped_by: Option<GroupedBy>,

    #[serde(default)]
    pub max_distance: f32,

    #[serde(default)]
    pub min_distance: f32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<GroupHit>,
}

/// The property path and value a group was formed over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedBy {
    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

/// A single member of a group.
///
/// Hits carry the member's projected properties plus a nested `_additional`
/// subtree, which is the second typed level of the recursion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupHit {
    #[serde(rename = "_additional", default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<GroupHitAdditional>,

    /// Projected properties of the hit.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// Nested metadata of a group hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHitAdditional {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vector: Vec<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}
