//! Encode/decode round-trip behavior of the full codec.

use serde_json::json;

use quiver_core::{Additional, PassthroughEnricher};
use quiver_storage::{marshal, unmarshal, CodecError};

use crate::common::{object_map, sample_object, sample_object_with_named_vectors};

#[test]
fn test_full_round_trip_is_identity() {
    let mut object = sample_object_with_named_vectors();
    object.additional = Some(
        serde_json::from_value::<Additional>(json!({
            "classification": {"basedOn": ["name"]},
            "interpretation": {"source": [{"concept": "thing"}]},
        }))
        .expect("additional"),
    );
    object.vector_weights = json!({"title": "0.5", "body": "2"});

    let bytes = marshal(&object).expect("marshal");
    let decoded = unmarshal(&bytes, &PassthroughEnricher).expect("unmarshal");

    assert_eq!(decoded, object);
}

#[test]
fn test_frame_layout_of_canonical_object() {
    let object = sample_object();
    let bytes = marshal(&object).expect("marshal");

    // version byte
    assert_eq!(bytes[0], 1);
    // vector length sits at the fixed offset, little-endian
    assert_eq!(&bytes[42..44], &[0x03, 0x00]);

    let props_len = serde_json::to_vec(object.properties.as_ref().expect("props"))
        .expect("props json")
        .len();
    // header + vec len + 3 floats + class len + "Thing" + four u32-prefixed
    // json regions ("null" for additional and weights) + two empty
    // named-vector regions
    let expected = 42 + 2 + 12 + 2 + 5 + (4 + props_len) + (4 + 4) + (4 + 4) + (4 + 0) + (4 + 0);
    assert_eq!(bytes.len(), expected);
}

#[test]
fn test_decode_mutate_reencode() {
    let object = sample_object();
    let bytes = marshal(&object).expect("marshal");

    let mut decoded = unmarshal(&bytes, &PassthroughEnricher).expect("unmarshal");
    decoded
        .properties
        .as_mut()
        .expect("props")
        .insert("age".to_string(), json!(4));

    let bytes = marshal(&decoded).expect("re-marshal");
    let again = unmarshal(&bytes, &PassthroughEnricher).expect("re-unmarshal");

    assert_eq!(again.properties.as_ref().expect("props")["age"], json!(4));
    assert_eq!(again.properties.as_ref().expect("props")["name"], json!("a"));
    assert_eq!(again.id, object.id);
    assert_eq!(again.doc_id, object.doc_id);
    assert_eq!(again.class, object.class);
    assert_eq!(again.creation_time_unix, object.creation_time_unix);
    assert_eq!(again.last_update_time_unix, object.last_update_time_unix);
    assert_eq!(again.vector, object.vector);
}

#[test]
fn test_null_valued_properties_vanish_on_round_trip() {
    let mut object = sample_object();
    // bypass the constructor-level stripping to prove the encoder strips too
    object.properties = Some(object_map(json!({"name": "a", "gone": null})));

    let bytes = marshal(&object).expect("marshal");
    let decoded = unmarshal(&bytes, &PassthroughEnricher).expect("unmarshal");

    let props = decoded.properties.expect("props");
    assert!(props.contains_key("name"));
    assert!(!props.contains_key("gone"));
}

#[test]
fn test_weights_survive_modulo_key_order() {
    let mut object = sample_object();
    object.vector_weights = json!({"b": 1, "a": 2});

    let bytes = marshal(&object).expect("marshal");
    let decoded = unmarshal(&bytes, &PassthroughEnricher).expect("unmarshal");

    assert_eq!(decoded.vector_weights, json!({"a": 2, "b": 1}));
}

#[test]
fn test_empty_vector_encodes_as_zero_length() {
    let mut object = sample_object();
    object.vector = Vec::new();
    object.vector_len = 0;

    let bytes = marshal(&object).expect("marshal");
    assert_eq!(&bytes[42..44], &[0x00, 0x00]);

    let decoded = unmarshal(&bytes, &PassthroughEnricher).expect("unmarshal");
    assert!(decoded.vector.is_empty());
    assert_eq!(decoded.vector_len, 0);
}

#[test]
fn test_empty_class_name_round_trips() {
    let mut object = sample_object();
    object.class = String::new();

    let bytes = marshal(&object).expect("marshal");
    let decoded = unmarshal(&bytes, &PassthroughEnricher).expect("unmarshal");
    assert_eq!(decoded.class, "");
}

#[test]
fn test_unsupported_version_byte_fails_decode() {
    let mut bytes = marshal(&sample_object()).expect("marshal");
    bytes[0] = 2;

    assert!(matches!(
        unmarshal(&bytes, &PassthroughEnricher),
        Err(CodecError::UnsupportedVersion(2))
    ));
}
