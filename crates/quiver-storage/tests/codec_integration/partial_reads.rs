//! Selective decoders: field masks, projections, and single-field reads.

use serde_json::Map;

use quiver_core::{FieldMask, PassthroughEnricher, PropertyProjection};
use quiver_storage::{
    doc_id_and_update_time_from_bytes, doc_id_from_bytes, marshal, properties_from_bytes,
    unmarshal_optional, unmarshal_uuid_and_class, vector_from_bytes, CodecError,
};

use crate::common::{fixed_uuid, sample_object, sample_object_with_named_vectors};

#[test]
fn test_doc_id_and_update_time() {
    let bytes = marshal(&sample_object()).expect("marshal");
    let (doc_id, update_time) = doc_id_and_update_time_from_bytes(&bytes).expect("decode");
    assert_eq!(doc_id, 42);
    assert_eq!(update_time, 2000);
}

#[test]
fn test_doc_id_only() {
    let bytes = marshal(&sample_object()).expect("marshal");
    assert_eq!(doc_id_from_bytes(&bytes).expect("decode"), 42);
}

#[test]
fn test_uuid_and_class_stub() {
    let bytes = marshal(&sample_object()).expect("marshal");
    let stub = unmarshal_uuid_and_class(&bytes).expect("decode");

    assert_eq!(stub.id, fixed_uuid());
    assert_eq!(stub.class, "Thing");
    assert_eq!(stub.doc_id, 42);
    // nothing else is materialized
    assert!(stub.properties.is_none());
    assert!(stub.vector.is_empty());
}

#[test]
fn test_primary_vector_via_fixed_offset() {
    let bytes = marshal(&sample_object()).expect("marshal");
    let vector = vector_from_bytes(&bytes, Vec::new(), "").expect("decode");
    assert_eq!(vector, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_primary_vector_reuses_scratch_with_sufficient_capacity() {
    let bytes = marshal(&sample_object()).expect("marshal");

    let scratch: Vec<f32> = Vec::with_capacity(4);
    let scratch_ptr = scratch.as_ptr();

    let vector = vector_from_bytes(&bytes, scratch, "").expect("decode");
    assert_eq!(vector, vec![1.0, 2.0, 3.0]);
    assert_eq!(vector.as_ptr(), scratch_ptr, "scratch must be reused");
    assert!(vector.capacity() >= 4);
}

#[test]
fn test_named_vectors_by_name() {
    let object = sample_object_with_named_vectors();
    let bytes = marshal(&object).expect("marshal");

    for (name, expected) in &object.vectors {
        let vector = vector_from_bytes(&bytes, Vec::new(), name).expect("decode");
        assert_eq!(&vector, expected, "vector {name}");
    }

    let err = vector_from_bytes(&bytes, Vec::new(), "nope").expect_err("unknown name");
    assert!(matches!(err, CodecError::VectorNotFound(name) if name == "nope"));
}

#[test]
fn test_empty_input_yields_empty_vector() {
    let vector = vector_from_bytes(&[], Vec::new(), "").expect("empty input");
    assert!(vector.is_empty());
}

#[test]
fn test_optional_decode_materializes_requested_named_vectors_only() {
    let bytes = marshal(&sample_object_with_named_vectors()).expect("marshal");

    let mask = FieldMask {
        vectors: vec!["a".to_string()],
        ..Default::default()
    };
    let decoded = unmarshal_optional(&bytes, &mask, None, &PassthroughEnricher).expect("decode");

    assert_eq!(decoded.vectors.len(), 1);
    assert_eq!(decoded.vectors["a"], vec![1.0]);
    assert!(!decoded.vectors.contains_key("b"));
}

#[test]
fn test_no_props_mask_skips_properties() {
    let bytes = marshal(&sample_object()).expect("marshal");

    let mask = FieldMask {
        no_props: true,
        ..Default::default()
    };
    let decoded = unmarshal_optional(&bytes, &mask, None, &PassthroughEnricher).expect("decode");

    assert!(decoded.properties.is_none());
    assert_eq!(decoded.id, fixed_uuid());
    assert_eq!(decoded.class, "Thing");
    assert_eq!(decoded.creation_time_unix, 1000);
    assert_eq!(decoded.last_update_time_unix, 2000);
    // the body is skipped but the length survives
    assert!(decoded.vector.is_empty());
    assert_eq!(decoded.vector_len, 3);
}

#[test]
fn test_vector_mask_materializes_primary_vector() {
    let bytes = marshal(&sample_object()).expect("marshal");

    let mask = FieldMask {
        vector: true,
        no_props: true,
        ..Default::default()
    };
    let decoded = unmarshal_optional(&bytes, &mask, None, &PassthroughEnricher).expect("decode");
    assert_eq!(decoded.vector, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_fast_path_never_touches_skipped_json() {
    // corrupt the properties region in place; a decode that skips properties
    // must not notice, a full parse must fail
    let object = sample_object();
    let mut bytes = marshal(&object).expect("marshal");

    let props_len_at = 42 + 2 + 4 * 3 + 2 + "Thing".len();
    let props_len = u32::from_le_bytes(
        bytes[props_len_at..props_len_at + 4]
            .try_into()
            .expect("4 bytes"),
    ) as usize;
    let props_start = props_len_at + 4;
    bytes[props_start..props_start + props_len].fill(b'x');

    let mask = FieldMask {
        no_props: true,
        ..Default::default()
    };
    let decoded = unmarshal_optional(&bytes, &mask, None, &PassthroughEnricher)
        .expect("skipped regions are never parsed");

    assert!(decoded.properties.is_none());
    assert_eq!(decoded.vector_weights, serde_json::Value::Null);
    assert_eq!(decoded.class, "Thing");
    assert_eq!(decoded.id, fixed_uuid());

    let err = quiver_storage::unmarshal(&bytes, &PassthroughEnricher).expect_err("full parse");
    assert!(matches!(err, CodecError::MalformedJson(_)));
}

#[test]
fn test_projection_limits_decoded_properties() {
    let bytes = marshal(&sample_object()).expect("marshal");

    let projection = PropertyProjection::new(["name"]);
    let decoded = unmarshal_optional(
        &bytes,
        &FieldMask::default(),
        Some(&projection),
        &PassthroughEnricher,
    )
    .expect("decode");

    let props = decoded.properties.expect("props");
    assert_eq!(props.len(), 1);
    assert_eq!(props["name"], serde_json::json!("a"));
}

#[test]
fn test_empty_projection_is_not_a_full_parse() {
    let bytes = marshal(&sample_object()).expect("marshal");

    // an explicitly-empty projection asks for zero properties
    let projection = PropertyProjection::default();
    let decoded = unmarshal_optional(
        &bytes,
        &FieldMask::default(),
        Some(&projection),
        &PassthroughEnricher,
    )
    .expect("decode");
    assert_eq!(
        decoded.properties.as_ref().map(|props| props.len()),
        Some(0)
    );

    // no projection at all is the full parse
    let decoded =
        unmarshal_optional(&bytes, &FieldMask::default(), None, &PassthroughEnricher)
            .expect("decode");
    assert_eq!(decoded.properties.as_ref().map(|props| props.len()), Some(2));
}

#[test]
fn test_properties_from_bytes_reuses_output_map() {
    let first = marshal(&sample_object()).expect("marshal");

    let mut other = sample_object();
    other.set_properties(crate::common::object_map(serde_json::json!({"age": 7})));
    let second = marshal(&other).expect("marshal");

    let projection = PropertyProjection::new(["name", "age"]);
    let mut out = Map::new();

    properties_from_bytes(&first, &mut out, &projection).expect("first");
    assert_eq!(out.len(), 2);

    properties_from_bytes(&second, &mut out, &projection).expect("second");
    assert_eq!(out.len(), 1);
    assert_eq!(out["age"], serde_json::json!(7.0));
}
