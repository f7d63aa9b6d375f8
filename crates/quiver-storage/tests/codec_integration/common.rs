//! Shared builders for codec integration tests.

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use quiver_core::{StoredObject, Vectors};

/// The UUID used by the canonical test object.
pub fn fixed_uuid() -> Uuid {
    Uuid::parse_str("11111111-1111-1111-1111-111111111111").expect("valid uuid")
}

pub fn object_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected json object, got {other:?}"),
    }
}

/// The canonical object: doc id 42, class `Thing`, a 3-dimensional vector,
/// two simple properties, no additional metadata, no weights.
pub fn sample_object() -> StoredObject {
    let mut object = StoredObject::new(42);
    object.id = fixed_uuid();
    object.class = "Thing".to_string();
    object.creation_time_unix = 1000;
    object.last_update_time_unix = 2000;
    object.vector = vec![1.0, 2.0, 3.0];
    object.vector_len = 3;
    object.set_properties(object_map(json!({"name": "a", "age": 3})));
    object
}

/// The canonical object plus two named vectors.
pub fn sample_object_with_named_vectors() -> StoredObject {
    let mut object = sample_object();
    let mut vectors: Vectors = HashMap::new();
    vectors.insert("a".to_string(), vec![1.0]);
    vectors.insert("b".to_string(), vec![2.0, 3.0]);
    object.vectors = vectors;
    object
}
