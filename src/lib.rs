//! Purpose: Map decoded JSON value trees onto registered typed objects and back.
//! Exports: `core` (schema, registry, populate/emit, coercion, errors).
//! Role: Library for hosts that already hold a `serde_json::Value` and want a
//! validated, strongly-typed object graph out of it.
//! Invariants: Registration happens before use; a `Registry` shared by
//! reference is read-only and safe to map against from many threads.
//! Invariants: The mapper never parses JSON text and never performs I/O.
pub mod core;
