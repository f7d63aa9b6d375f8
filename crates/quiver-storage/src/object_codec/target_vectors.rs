//! Embedded offset index for named secondary vectors.
//!
//! The named-vector section of the frame is two regions. First a
//! MessagePack-encoded mapping from vector name to a byte offset, then a
//! packed segment holding one `(u16 length, length x f32-bits)` record per
//! name at exactly that offset. Readers resolve a name through the offsets
//! map and seek straight to its record, so a single named vector costs one
//! map decode plus one seek regardless of how many vectors are stored.
//!
//! Frames written before named vectors existed simply end after the
//! vector-weights region. A reader that finds the cursor already at the end
//! of the buffer treats the whole section as absent.

use std::collections::HashMap;

use quiver_core::Vectors;

use crate::byteops::{ByteReader, ByteWriter};
use crate::error::{CodecError, CodecResult};

use super::{MAX_TARGET_VECTORS_OFFSETS_LEN, MAX_TARGET_VECTORS_SEGMENT_LEN, MAX_VECTOR_LEN};

/// Pre-computed layout of the named-vector section.
///
/// Planning assigns each name a segment-relative offset in iteration order
/// and records that order, because the segment body must be written in the
/// same order for the offsets to stay valid. The map itself is order-free;
/// readers only ever go through the offsets.
#[derive(Debug, Default)]
pub(super) struct TargetVectorsLayout {
    /// MessagePack bytes of the offsets map. Empty when there are no vectors.
    pub offsets: Vec<u8>,
    /// Names in offset-assignment order.
    order: Vec<String>,
    pub segment_len: u32,
}

impl TargetVectorsLayout {
    pub fn plan(vectors: &Vectors) -> CodecResult<Self> {
        if vectors.is_empty() {
            return Ok(Self::default());
        }

        let mut offsets_map: HashMap<&str, u32> = HashMap::with_capacity(vectors.len());
        let mut order = Vec::with_capacity(vectors.len());
        let mut segment_len: usize = 0;

        for (name, vector) in vectors {
            if vector.len() > MAX_VECTOR_LEN {
                return Err(CodecError::FieldTooLarge {
                    field: "vector",
                    actual: vector.len(),
                    max: MAX_VECTOR_LEN,
                });
            }

            offsets_map.insert(name.as_str(), segment_len as u32);
            segment_len += 2 + 4 * vector.len();
            if segment_len > MAX_TARGET_VECTORS_SEGMENT_LEN {
                return Err(CodecError::FieldTooLarge {
                    field: "targetVectorsSegment",
                    actual: segment_len,
                    max: MAX_TARGET_VECTORS_SEGMENT_LEN,
                });
            }
            order.push(name.clone());
        }

        let offsets = rmp_serde::to_vec(&offsets_map)?;
        if offsets.len() > MAX_TARGET_VECTORS_OFFSETS_LEN {
            return Err(CodecError::FieldTooLarge {
                field: "targetVectorsOffsets",
                actual: offsets.len(),
                max: MAX_TARGET_VECTORS_OFFSETS_LEN,
            });
        }

        Ok(Self {
            offsets,
            order,
            segment_len: segment_len as u32,
        })
    }

    /// Write the packed segment in offset-assignment order.
    pub fn write_segment(&self, vectors: &Vectors, w: &mut ByteWriter) -> CodecResult<()> {
        for name in &self.order {
            let vector = &vectors[name.as_str()];
            w.write_u16(vector.len() as u16)?;
            for &value in vector {
                w.write_f32(value)?;
            }
        }
        Ok(())
    }
}

/// The decoded offsets map plus the segment's absolute position.
struct SectionIndex {
    offsets: HashMap<String, u32>,
    segment_start: usize,
    segment_len: usize,
}

/// Read the offsets region, or `None` when the section is absent.
///
/// Absent covers both a frame that ends before the section (pre-named-vector
/// payloads) and a frame whose offsets region is empty.
fn read_index(r: &mut ByteReader<'_>) -> CodecResult<Option<SectionIndex>> {
    if r.is_at_end() {
        return Ok(None);
    }

    let offsets_bytes = r.read_u32_prefixed_bytes()?;
    let segment_len = r.read_u32()? as usize;
    let segment_start = r.position();

    if offsets_bytes.is_empty() {
        return Ok(None);
    }

    let offsets: HashMap<String, u32> = rmp_serde::from_slice(offsets_bytes)?;
    Ok(Some(SectionIndex {
        offsets,
        segment_start,
        segment_len,
    }))
}

fn read_vector_record(r: &mut ByteReader<'_>) -> CodecResult<Vec<f32>> {
    let len = r.read_u16()? as usize;
    let mut vector = Vec::with_capacity(len);
    for _ in 0..len {
        vector.push(r.read_f32()?);
    }
    Ok(vector)
}

/// Decode every named vector. Leaves the cursor at the end of the segment.
pub(super) fn unmarshal_target_vectors(r: &mut ByteReader<'_>) -> CodecResult<Option<Vectors>> {
    let Some(index) = read_index(r)? else {
        return Ok(None);
    };

    let mut vectors = Vectors::with_capacity(index.offsets.len());
    for (name, offset) in index.offsets {
        r.seek(index.segment_start + offset as usize)?;
        vectors.insert(name, read_vector_record(r)?);
    }

    r.seek(index.segment_start + index.segment_len)?;
    Ok(Some(vectors))
}

/// Decode only the requested names, skipping every other record.
///
/// Requested names missing from the offsets map are ignored; lookups with
/// must-exist semantics go through [`unmarshal_single_target_vector`].
pub(super) fn unmarshal_target_vectors_subset(
    r: &mut ByteReader<'_>,
    names: &[String],
) -> CodecResult<Option<Vectors>> {
    let Some(index) = read_index(r)? else {
        return Ok(None);
    };

    let mut vectors = Vectors::with_capacity(names.len());
    for name in names {
        let Some(&offset) = index.offsets.get(name) else {
            continue;
        };
        r.seek(index.segment_start + offset as usize)?;
        vectors.insert(name.clone(), read_vector_record(r)?);
    }

    r.seek(index.segment_start + index.segment_len)?;
    Ok(Some(vectors))
}

/// Decode exactly one named vector.
pub(super) fn unmarshal_single_target_vector(
    r: &mut ByteReader<'_>,
    target_vector: &str,
) -> CodecResult<Vec<f32>> {
    let Some(index) = read_index(r)? else {
        return Err(CodecError::VectorNotFound(target_vector.to_string()));
    };

    let Some(&offset) = index.offsets.get(target_vector) else {
        return Err(CodecError::VectorNotFound(target_vector.to_string()));
    };

    r.seek(index.segment_start + offset as usize)?;
    read_vector_record(r)
}
