//! Test modules for meshply-io
//!
//! End-to-end tests that go through files or in-memory images, covering the
//! reader over all three encodings, writer round trips, and extension dispatch.
