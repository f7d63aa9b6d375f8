//! Concurrent bulk materialization of objects by doc id.

use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::debug;

use quiver_core::{FieldMask, PropertyProjection, SchemaEnricher, StoredObject};

use crate::buffer_pool;
use crate::error::CodecResult;
use crate::object_codec;

/// Secondary index under which the objects bucket registers doc ids.
pub const DOC_ID_SECONDARY_INDEX: usize = 0;

/// Read access to the underlying key-value bucket.
///
/// Implementations must be safe for concurrent reads; the bulk fetch path
/// calls this from multiple workers at once.
pub trait ObjectBucket: Send + Sync {
    /// Look up a value by secondary index, reading into `buf`.
    ///
    /// `buf` is caller-owned scratch that implementations may grow; the value
    /// comes back as a slice borrowed from it, so growth is adopted by the
    /// caller automatically. A key with no entry yields `Ok(None)`, which is
    /// not an error.
    fn get_by_secondary_with_buffer<'a>(
        &self,
        index: usize,
        key: &[u8],
        buf: &'a mut Vec<u8>,
    ) -> CodecResult<Option<&'a [u8]>>;
}

/// Worker pool for bulk fetches.
///
/// Sized at twice the logical CPU count: the work is mostly IO-bound against
/// the bucket, so oversubscribing keeps the CPUs busy while reads block.
fn fetch_pool() -> &'static rayon::ThreadPool {
    static POOL: OnceLock<rayon::ThreadPool> = OnceLock::new();
    POOL.get_or_init(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(fetch_parallelism())
            .thread_name(|i| format!("object-fetch-{i}"))
            .build()
            .expect("build object fetch pool")
    })
}

fn fetch_parallelism() -> usize {
    2 * num_cpus::get()
}

/// Materialize the objects stored under `ids`, preserving input order.
///
/// Ids the bucket has no entry for are dropped from the output; everything
/// else fails the whole call with the first error encountered. A single id
/// is served inline, anything more is chunked across the fetch pool with
/// each worker holding its own pooled scratch buffer.
pub fn objects_by_doc_ids(
    bucket: &dyn ObjectBucket,
    ids: &[u64],
    mask: &FieldMask,
    projection: Option<&PropertyProjection>,
    enricher: &dyn SchemaEnricher,
) -> CodecResult<Vec<StoredObject>> {
    if ids.len() == 1 {
        // coordination overhead is not worth it for a single result
        let fetched = fetch_chunk(bucket, ids, mask, projection, enricher)?;
        return Ok(fetched.into_iter().flatten().collect());
    }

    let parallelism = fetch_parallelism();
    let chunk_size = ids.len().div_ceil(parallelism).max(1);
    debug!(
        total = ids.len(),
        parallelism, chunk_size, "bulk object fetch"
    );

    // chunk i covers ids[i * chunk_size ..], so output positions are
    // deterministic regardless of which worker finishes first
    let chunks: Vec<Vec<Option<StoredObject>>> = fetch_pool().install(|| {
        ids.par_chunks(chunk_size)
            .map(|chunk| fetch_chunk(bucket, chunk, mask, projection, enricher))
            .collect::<CodecResult<Vec<_>>>()
    })?;

    Ok(chunks.into_iter().flatten().flatten().collect())
}

/// Fetch and decode one contiguous range of ids.
///
/// Returns one slot per id so the caller can compact misses while keeping
/// positions stable. The scratch buffer is returned to the pool only on
/// success; an early exit just costs a future allocation.
fn fetch_chunk(
    bucket: &dyn ObjectBucket,
    ids: &[u64],
    mask: &FieldMask,
    projection: Option<&PropertyProjection>,
    enricher: &dyn SchemaEnricher,
) -> CodecResult<Vec<Option<StoredObject>>> {
    let mut out = Vec::with_capacity(ids.len());
    let mut scratch = buffer_pool::shared().get();

    for &id in ids {
        let key = id.to_le_bytes();
        let found =
            bucket.get_by_secondary_with_buffer(DOC_ID_SECONDARY_INDEX, &key, &mut scratch)?;
        match found {
            None => out.push(None),
            Some(data) => {
                let object = object_codec::unmarshal_optional(data, mask, projection, enricher)?;
                out.push(Some(object));
            }
        }
    }

    buffer_pool::shared().put(scratch);
    Ok(out)
}
