//! The materialized stored object.

use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::additional::Additional;
use super::projection::FieldMask;

/// The only binary marshaller version in existence.
pub const MARSHALLER_VERSION: u8 = 1;

/// Named secondary vectors keyed by target-vector name.
pub type Vectors = HashMap<String, Vec<f32>>;

/// A stored object as the storage layer materializes it.
///
/// Instances are built in memory from a create/update request or by one of
/// the binary decoders, and are owned by the caller. `Clone` is a true deep
/// copy: every field is owned data.
///
/// `belongs_to_node`, `belongs_to_shard`, `is_consistent`, and `vector_len`
/// never hit the wire. `vector_len` caches the primary vector's length so it
/// survives decodes that skip the vector body.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub marshaller_version: u8,
    pub doc_id: u64,
    pub id: Uuid,
    pub class: String,
    /// Milliseconds since the Unix epoch. Zero means unset.
    pub creation_time_unix: i64,
    /// Milliseconds since the Unix epoch. Zero means unset.
    pub last_update_time_unix: i64,
    pub vector: Vec<f32>,
    pub vector_len: usize,
    pub vectors: Vectors,
    pub properties: Option<Map<String, Value>>,
    pub additional: Option<Additional>,
    /// Arbitrary JSON. `Value::Null` means no weights.
    pub vector_weights: Value,
    pub belongs_to_node: Option<String>,
    pub belongs_to_shard: Option<String>,
    pub is_consistent: bool,
}

impl Default for StoredObject {
    fn default() -> Self {
        Self {
            marshaller_version: MARSHALLER_VERSION,
            doc_id: 0,
            id: Uuid::nil(),
            class: String::new(),
            creation_time_unix: 0,
            last_update_time_unix: 0,
            vector: Vec::new(),
            vector_len: 0,
            vectors: HashMap::new(),
            properties: None,
            additional: None,
            vector_weights: Value::Null,
            belongs_to_node: None,
            belongs_to_shard: None,
            is_consistent: false,
        }
    }
}

impl StoredObject {
    /// A fresh object carrying only its storage-layer identifier.
    pub fn new(doc_id: u64) -> Self {
        Self {
            doc_id,
            ..Default::default()
        }
    }

    /// Replace the property mapping.
    ///
    /// Null-valued entries are dropped so that leaving a property out and
    /// setting it to null are indistinguishable downstream.
    pub fn set_properties(&mut self, mut properties: Map<String, Value>) {
        properties.retain(|_, value| !value.is_null());
        self.properties = Some(properties);
    }

    /// The stored explain score, if any.
    pub fn explain_score(&self) -> Option<&str> {
        self.additional.as_ref().and_then(Additional::explain_score)
    }

    /// An object is usable once it carries an identity and a class.
    pub fn is_valid(&self) -> bool {
        !self.id.is_nil() && !self.class.is_empty()
    }

    /// The property mapping adjusted for the caller's field mask.
    ///
    /// Unless `ref_meta` is requested, classification metadata is stripped
    /// from every element of every multi-reference property value. A value
    /// counts as a multi-reference when it is an array whose elements are
    /// objects carrying a `beacon` key.
    pub fn properties_with_additional(&self, mask: &FieldMask) -> Option<Map<String, Value>> {
        let properties = self.properties.as_ref()?;
        if mask.ref_meta {
            return Some(properties.clone());
        }

        let mut out = properties.clone();
        for value in out.values_mut() {
            let Value::Array(elements) = value else {
                continue;
            };
            let is_ref_list = elements
                .iter()
                .all(|el| el.as_object().is_some_and(|obj| obj.contains_key("beacon")));
            if elements.is_empty() || !is_ref_list {
                continue;
            }
            for element in elements {
                if let Value::Object(obj) = element {
                    obj.remove("classification");
                }
            }
        }
        Some(out)
    }
}

/// Tag a batch of decoded objects with the node and shard that served them.
///
/// Pure runtime bookkeeping for the replication layer; neither field is part
/// of the binary representation.
pub fn assign_ownership(objects: &mut [StoredObject], node: &str, shard: &str) {
    for object in objects {
        object.belongs_to_node = Some(node.to_string());
        object.belongs_to_shard = Some(shard.to_string());
    }
}
