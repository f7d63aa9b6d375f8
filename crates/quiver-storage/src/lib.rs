//! Binary object codec and bulk materializer for the quiver storage layer.
//!
//! The codec defines the versioned on-disk representation of a stored
//! object: identity, timestamps, class, primary vector, named secondary
//! vectors, property JSON, additional metadata, and vector weights. The
//! layout is position-sensitive so that partial decoders can extract single
//! fields without paying for the rest; see [`object_codec`] for the exact
//! frame.
//!
//! Everything here is synchronous and stateless per call. The only
//! concurrency lives in [`bulk`], which fans bucket reads out over a bounded
//! worker pool.

pub mod buffer_pool;
pub mod bulk;
pub mod byteops;
pub mod error;
pub mod object_codec;

pub use buffer_pool::{BufferPool, DEFAULT_BUFFER_CAPACITY};
pub use bulk::{objects_by_doc_ids, ObjectBucket, DOC_ID_SECONDARY_INDEX};
pub use error::{CodecError, CodecResult};
pub use object_codec::{
    doc_id_and_update_time_from_bytes, doc_id_from_bytes, marshal, properties_from_bytes,
    unmarshal, unmarshal_optional, unmarshal_properties, unmarshal_uuid_and_class,
    vector_from_bytes, PRIMARY_VECTOR_LEN_OFFSET,
};
