//! Field masks and property projections for partial reads.

use std::collections::HashMap;

use serde_json::Value;

/// Options driving a partial decode.
///
/// Every flag defaults to off, which makes the default mask the cheapest
/// possible read: identity, timestamps, and class name only.
#[derive(Debug, Clone, Default)]
pub struct FieldMask {
    /// Materialize the primary vector instead of skipping its bytes.
    pub vector: bool,

    /// Do not copy or parse the properties region at all.
    pub no_props: bool,

    /// Materialize the `additional` region for its classification subtree.
    pub classification: bool,

    /// Keep reference classification metadata on multi-reference property
    /// values when projecting to a search result.
    pub ref_meta: bool,

    /// Copy the group subtree through to the search result.
    pub group: bool,

    /// Per-module flags. The `additional` region is materialized whenever any
    /// module param is present. The well-known `interpretation` key is copied
    /// through to the search result when set to `true`.
    pub module_params: HashMap<String, Value>,

    /// Named vectors to materialize. Empty skips the named-vector section.
    pub vectors: Vec<String>,
}

impl FieldMask {
    /// True when the `interpretation` module flag is set.
    pub fn interpretation(&self) -> bool {
        matches!(
            self.module_params.get("interpretation"),
            Some(Value::Bool(true))
        )
    }

    /// True when the `additional` region must be materialized during decode.
    pub fn wants_additional(&self) -> bool {
        self.classification || !self.module_params.is_empty()
    }
}

/// Property names a caller wants materialized during a partial decode.
///
/// Each name also carries its lookup path; for top-level properties this is
/// the singleton path `[name]`. Properties outside the projection are skipped
/// entirely during JSON walking.
#[derive(Debug, Clone, Default)]
pub struct PropertyProjection {
    pub names: Vec<String>,
    pub paths: Vec<Vec<String>>,
}

impl PropertyProjection {
    /// Build a projection over top-level property names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let paths = names.iter().map(|name| vec![name.clone()]).collect();
        Self { names, paths }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
