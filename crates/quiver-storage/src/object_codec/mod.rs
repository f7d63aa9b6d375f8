//! Versioned binary representation of stored objects.
//!
//! # Binary layout, version 1
//!
//! All integers are little-endian; f32 values travel as their bit pattern in
//! a u32 slot.
//!
//! | Bytes | Type   | Field |
//! |-------|--------|-------|
//! | 1     | u8     | marshaller version, always 1 |
//! | 8     | u64    | doc id, kept early so id-only lookups stay cheap |
//! | 1     | u8     | kind, deprecated, always written as 1 |
//! | 16    | u128   | uuid |
//! | 8     | i64    | creation time (unix ms) |
//! | 8     | i64    | last update time (unix ms) |
//! | 2     | u16    | primary vector length n |
//! | 4n    | [f32]  | primary vector |
//! | 2     | u16    | class name length c |
//! | c     | [u8]   | class name (UTF-8) |
//! | 4     | u32    | properties json length s |
//! | s     | [u8]   | properties json |
//! | 4     | u32    | additional json length m |
//! | m     | [u8]   | additional json |
//! | 4     | u32    | vector weights json length w |
//! | w     | [u8]   | vector weights json |
//! | 4     | u32    | named-vector offsets length o (section may be absent) |
//! | o     | [u8]   | msgpack map { name: byte offset into segment } |
//! | 4     | u32    | named-vector segment length v |
//! | v     | [u8]   | packed records, (u16 length, [f32]) each |
//!
//! The named-vector section was added later; payloads written before it
//! simply end after the weights region and every decoder tolerates that.
//!
//! Each partial decoder consumes a prefix of this sequence and skips the
//! regions its field mask rules out, using the length prefixes to jump over
//! variable-length regions exactly.

mod properties;
mod target_vectors;

pub use properties::unmarshal_properties;

use serde_json::{Map, Value};
use uuid::Uuid;

use quiver_core::{
    FieldMask, PropertyProjection, SchemaEnricher, StoredObject, Vectors, MARSHALLER_VERSION,
};

use crate::byteops::{ByteReader, ByteWriter};
use crate::error::{CodecError, CodecResult};

use target_vectors::TargetVectorsLayout;

/// Absolute offset of the primary-vector length field.
///
/// Everything before it is fixed-width, which is what makes O(1) vector
/// extraction possible. Inserting a field ahead of this offset breaks the
/// wire contract.
pub const PRIMARY_VECTOR_LEN_OFFSET: usize = 1 + 8 + 1 + 16 + 8 + 8;

/// Deprecated kind discriminator, still occupying one byte in the frame.
const KIND_BYTE: u8 = 1;

pub(crate) const MAX_VECTOR_LEN: usize = u16::MAX as usize;
const MAX_CLASS_NAME_LEN: usize = u16::MAX as usize;
const MAX_PROPERTIES_LEN: usize = u32::MAX as usize;
const MAX_ADDITIONAL_LEN: usize = u32::MAX as usize;
const MAX_VECTOR_WEIGHTS_LEN: usize = u32::MAX as usize;
pub(crate) const MAX_TARGET_VECTORS_OFFSETS_LEN: usize = u32::MAX as usize;
pub(crate) const MAX_TARGET_VECTORS_SEGMENT_LEN: usize = u32::MAX as usize;

fn check_region(field: &'static str, actual: usize, max: usize) -> CodecResult<()> {
    if actual > max {
        return Err(CodecError::FieldTooLarge { field, actual, max });
    }
    Ok(())
}

fn expect_version(version: u8) -> CodecResult<()> {
    if version != MARSHALLER_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Serialize an object into its version-1 frame.
///
/// All size limits are validated up front; the output buffer is allocated
/// once at the exact frame length and no bytes are written until every
/// region is known to fit.
pub fn marshal(object: &StoredObject) -> CodecResult<Vec<u8>> {
    expect_version(object.marshaller_version)?;

    check_region("vector", object.vector.len(), MAX_VECTOR_LEN)?;
    let class_name = object.class.as_bytes();
    check_region("className", class_name.len(), MAX_CLASS_NAME_LEN)?;

    let properties = properties::marshal_properties(object.properties.as_ref())?;
    check_region("properties", properties.len(), MAX_PROPERTIES_LEN)?;

    let additional = serde_json::to_vec(&object.additional)?;
    check_region("additional", additional.len(), MAX_ADDITIONAL_LEN)?;

    let vector_weights = serde_json::to_vec(&object.vector_weights)?;
    check_region("vectorWeights", vector_weights.len(), MAX_VECTOR_WEIGHTS_LEN)?;

    let layout = TargetVectorsLayout::plan(&object.vectors)?;

    let total = PRIMARY_VECTOR_LEN_OFFSET
        + 2
        + 4 * object.vector.len()
        + 2
        + class_name.len()
        + 4
        + properties.len()
        + 4
        + additional.len()
        + 4
        + vector_weights.len()
        + 4
        + layout.offsets.len()
        + 4
        + layout.segment_len as usize;

    let mut w = ByteWriter::with_exact_size(total);
    w.write_u8(object.marshaller_version)?;
    w.write_u64(object.doc_id)?;
    w.write_u8(KIND_BYTE)?;
    w.write_bytes(object.id.as_bytes())?;
    w.write_u64(object.creation_time_unix as u64)?;
    w.write_u64(object.last_update_time_unix as u64)?;

    w.write_u16(object.vector.len() as u16)?;
    for &value in &object.vector {
        w.write_f32(value)?;
    }

    w.write_u16(class_name.len() as u16)?;
    w.write_bytes(class_name)?;

    w.write_u32(properties.len() as u32)?;
    w.write_bytes(&properties)?;

    w.write_u32(additional.len() as u32)?;
    w.write_bytes(&additional)?;

    w.write_u32(vector_weights.len() as u32)?;
    w.write_bytes(&vector_weights)?;

    w.write_u32(layout.offsets.len() as u32)?;
    w.write_bytes(&layout.offsets)?;
    w.write_u32(layout.segment_len)?;
    layout.write_segment(&object.vectors, &mut w)?;

    Ok(w.into_bytes())
}

/// Decode a complete object.
pub fn unmarshal(data: &[u8], enricher: &dyn SchemaEnricher) -> CodecResult<StoredObject> {
    let mut r = ByteReader::new(data);
    let version = r.read_u8()?;
    expect_version(version)?;

    let doc_id = r.read_u64()?;
    r.skip(1)?; // deprecated kind byte
    let id = Uuid::from_slice(r.read_bytes(16)?)?;
    let creation_time_unix = r.read_u64()? as i64;
    let last_update_time_unix = r.read_u64()? as i64;

    let vector_len = r.read_u16()? as usize;
    let mut vector = Vec::with_capacity(vector_len);
    for _ in 0..vector_len {
        vector.push(r.read_f32()?);
    }

    let class_len = r.read_u16()? as usize;
    let class = String::from_utf8_lossy(r.read_bytes(class_len)?).into_owned();

    let properties_raw = r.read_u32_prefixed_bytes()?;
    let additional_raw = r.read_u32_prefixed_bytes()?;
    let weights_raw = r.read_u32_prefixed_bytes()?;

    let vectors = target_vectors::unmarshal_target_vectors(&mut r)?.unwrap_or_default();

    let mut object = StoredObject {
        marshaller_version: version,
        doc_id,
        id,
        class,
        creation_time_unix,
        last_update_time_unix,
        vector_len,
        vector,
        vectors,
        ..Default::default()
    };
    parse_json_regions(
        &mut object,
        properties_raw,
        None,
        additional_raw,
        weights_raw,
        enricher,
    )?;
    Ok(object)
}

/// Decode only the regions a field mask asks for.
///
/// The fixed header, class name, and timestamps are always materialized.
/// Variable-length regions outside the mask are skipped via their length
/// prefixes. JSON parsing happens only when at least one retained region
/// actually carries content; a weights region holding the four ASCII bytes
/// `null` counts as empty for that decision.
pub fn unmarshal_optional(
    data: &[u8],
    mask: &FieldMask,
    projection: Option<&PropertyProjection>,
    enricher: &dyn SchemaEnricher,
) -> CodecResult<StoredObject> {
    let mut r = ByteReader::new(data);
    let version = r.read_u8()?;
    expect_version(version)?;

    let doc_id = r.read_u64()?;
    r.skip(1)?; // deprecated kind byte
    let id = Uuid::from_slice(r.read_bytes(16)?)?;
    let creation_time_unix = r.read_u64()? as i64;
    let last_update_time_unix = r.read_u64()? as i64;

    // the vector length is kept even when the body is skipped, it feeds
    // usage metrics
    let vector_len = r.read_u16()? as usize;
    let mut vector = Vec::new();
    if mask.vector {
        vector.reserve_exact(vector_len);
        for _ in 0..vector_len {
            vector.push(r.read_f32()?);
        }
    } else {
        r.skip(vector_len * 4)?;
    }

    let class_len = r.read_u16()? as usize;
    let class = String::from_utf8_lossy(r.read_bytes(class_len)?).into_owned();

    let properties_len = r.read_u32()? as usize;
    let properties_raw: &[u8] = if mask.no_props {
        r.skip(properties_len)?;
        &[]
    } else {
        r.read_bytes(properties_len)?
    };

    let additional_len = r.read_u32()? as usize;
    let additional_raw: &[u8] = if mask.wants_additional() {
        r.read_bytes(additional_len)?
    } else {
        r.skip(additional_len)?;
        &[]
    };

    let weights_raw = r.read_u32_prefixed_bytes()?;

    let mut vectors = Vectors::new();
    if !mask.vectors.is_empty() {
        if let Some(requested) =
            target_vectors::unmarshal_target_vectors_subset(&mut r, &mask.vectors)?
        {
            vectors = requested;
        }
    }

    let mut object = StoredObject {
        marshaller_version: version,
        doc_id,
        id,
        class,
        creation_time_unix,
        last_update_time_unix,
        vector_len,
        vector,
        vectors,
        ..Default::default()
    };

    let weights_present = !weights_raw.is_empty() && weights_raw != b"null";
    let should_parse =
        !properties_raw.is_empty() || !additional_raw.is_empty() || weights_present;
    if should_parse {
        parse_json_regions(
            &mut object,
            properties_raw,
            projection,
            additional_raw,
            weights_raw,
            enricher,
        )?;
    }

    Ok(object)
}

/// Decode identity and class only, the cheapest existence check.
pub fn unmarshal_uuid_and_class(data: &[u8]) -> CodecResult<StoredObject> {
    let mut r = ByteReader::new(data);
    let version = r.read_u8()?;
    expect_version(version)?;

    let doc_id = r.read_u64()?;
    r.skip(1)?; // deprecated kind byte
    let id = Uuid::from_slice(r.read_bytes(16)?)?;
    r.skip(8 + 8)?; // timestamps

    let vector_len = r.read_u16()? as usize;
    r.skip(vector_len * 4)?;
    let class_len = r.read_u16()? as usize;
    let class = String::from_utf8_lossy(r.read_bytes(class_len)?).into_owned();

    Ok(StoredObject {
        marshaller_version: version,
        doc_id,
        id,
        class,
        ..Default::default()
    })
}

/// Read the doc id without touching anything past byte 9.
///
/// No version dispatch: the doc id sits right after the version byte in
/// every frame version there is.
pub fn doc_id_from_bytes(data: &[u8]) -> CodecResult<u64> {
    let mut r = ByteReader::new(data);
    r.skip(1)?;
    r.read_u64()
}

/// Read the doc id and last-update timestamp from the fixed header.
pub fn doc_id_and_update_time_from_bytes(data: &[u8]) -> CodecResult<(u64, i64)> {
    let mut r = ByteReader::new(data);
    let version = r.read_u8()?;
    expect_version(version)?;

    let doc_id = r.read_u64()?;
    r.skip(1 + 16 + 8)?; // kind byte, uuid, creation time
    let update_time = r.read_u64()? as i64;
    Ok((doc_id, update_time))
}

/// Extract one vector from a frame.
///
/// An empty `target_vector` selects the primary vector, read straight from
/// [`PRIMARY_VECTOR_LEN_OFFSET`] without decoding anything else; this is the
/// hot path for ANN queries that already hold a doc id. A named target walks
/// the frame's length prefixes up to the named-vector section and resolves
/// the name through the offset index.
///
/// `scratch` is reused for the primary path when its capacity suffices;
/// otherwise a fresh buffer is allocated. Empty input yields an empty vector.
pub fn vector_from_bytes(
    data: &[u8],
    scratch: Vec<f32>,
    target_vector: &str,
) -> CodecResult<Vec<f32>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    expect_version(data[0])?;

    if !target_vector.is_empty() {
        let mut r = ByteReader::with_position(data, PRIMARY_VECTOR_LEN_OFFSET);
        let vector_len = r.read_u16()? as usize;
        r.skip(vector_len * 4)?;
        let class_len = r.read_u16()? as usize;
        r.skip(class_len)?;
        for _ in 0..3 {
            // properties, additional, vector weights
            let region_len = r.read_u32()? as usize;
            r.skip(region_len)?;
        }
        return target_vectors::unmarshal_single_target_vector(&mut r, target_vector);
    }

    let mut r = ByteReader::with_position(data, PRIMARY_VECTOR_LEN_OFFSET);
    let vector_len = r.read_u16()? as usize;

    let mut out = if scratch.capacity() >= vector_len {
        let mut reused = scratch;
        reused.clear();
        reused
    } else {
        Vec::with_capacity(vector_len)
    };
    for _ in 0..vector_len {
        out.push(r.read_f32()?);
    }
    Ok(out)
}

/// Extract projected properties from a frame into a caller-owned map.
///
/// The map is cleared, not reallocated, so its capacity carries over when a
/// caller materializes properties for many objects in a row.
pub fn properties_from_bytes(
    data: &[u8],
    out: &mut Map<String, Value>,
    projection: &PropertyProjection,
) -> CodecResult<()> {
    let mut r = ByteReader::new(data);
    let version = r.read_u8()?;
    expect_version(version)?;

    r.seek(PRIMARY_VECTOR_LEN_OFFSET)?;
    let vector_len = r.read_u16()? as usize;
    r.skip(vector_len * 4)?;
    let class_len = r.read_u16()? as usize;
    r.skip(class_len)?;

    let properties_raw = r.read_u32_prefixed_bytes()?;
    unmarshal_properties(properties_raw, out, projection)
}

/// Parse the retained JSON regions into the object.
///
/// Empty slices mean the region was skipped by the caller's mask and leave
/// the corresponding field at its default. A supplied projection always
/// drives the restricted parser, even with zero names; asking for no
/// properties is a different request than not supplying a projection, which
/// is the only case that unmarshals the whole document.
fn parse_json_regions(
    object: &mut StoredObject,
    properties_raw: &[u8],
    projection: Option<&PropertyProjection>,
    additional_raw: &[u8],
    weights_raw: &[u8],
    enricher: &dyn SchemaEnricher,
) -> CodecResult<()> {
    if !properties_raw.is_empty() {
        let mut decoded: Option<Map<String, Value>> = match projection {
            Some(projection) => {
                let mut out = Map::new();
                unmarshal_properties(properties_raw, &mut out, projection)?;
                Some(out)
            }
            None => serde_json::from_slice(properties_raw)?,
        };
        if let Some(props) = &mut decoded {
            enricher.enrich(props, false)?;
        }
        object.properties = decoded;
    }

    if !additional_raw.is_empty() {
        object.additional = serde_json::from_slice(additional_raw)?;
    }

    if !weights_raw.is_empty() {
        object.vector_weights = serde_json::from_slice(weights_raw)?;
    }

    Ok(())
}
