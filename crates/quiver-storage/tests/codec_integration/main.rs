//! End-to-end scenarios for the version-1 object codec.

mod common;

mod partial_reads;
mod roundtrip;
