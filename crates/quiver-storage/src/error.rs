//! Error taxonomy for the binary object codec.
//!
//! Every failure bubbles up to the caller unchanged. The codec never logs,
//! never retries, and never swallows an error; a blob that fails to decode is
//! fatal for that blob only.

use quiver_core::EnrichmentError;
use thiserror::Error;

/// Errors produced while encoding or decoding stored objects.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The first byte of the blob names a marshaller version this codec does
    /// not speak. Never recovered.
    #[error("unsupported binary marshaller version {0}")]
    UnsupportedVersion(u8),

    /// The cursor ran off the end of the buffer.
    #[error("unexpected end of buffer at offset {offset}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// The 16 identity bytes do not form a valid UUID.
    #[error("parse uuid: {0}")]
    MalformedUuid(#[from] uuid::Error),

    /// A JSON region failed to parse.
    #[error("malformed json: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// A projected property value has a JSON type the projection path does
    /// not support.
    #[error("unknown data type {found} for property '{property}'")]
    UnknownPropertyType { property: String, found: String },

    /// Encode only: a variable-length region exceeds its length prefix.
    #[error("could not marshal '{field}': max length exceeded ({actual}/{max})")]
    FieldTooLarge {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    /// The requested name is not in the target-vector offsets map.
    #[error("vector not found for target vector: {0}")]
    VectorNotFound(String),

    /// The target-vector offsets map failed to encode.
    #[error("marshal target vector offsets: {0}")]
    OffsetsEncode(#[from] rmp_serde::encode::Error),

    /// The target-vector offsets map failed to decode.
    #[error("unmarshal target vector offsets: {0}")]
    OffsetsDecode(#[from] rmp_serde::decode::Error),

    /// Schema enrichment of decoded properties failed.
    #[error("enrich schema datatypes: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// The underlying key-value bucket failed a read.
    #[error("bucket read: {0}")]
    Bucket(String),
}

/// Convenient result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
