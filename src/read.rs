//! Read operations against the member and team tables.
//!
//! - Getting a single item by identifier
//! - Scanning a table with an optional filter and projection
//! - Batch retrieving items by identifier

/// Batch get item operation for retrieving many items by key.
pub mod batch_get_item;

/// Common arguments and types for read operations.
pub mod common;

/// Get item operation for retrieving a single item by key.
pub mod get_item;

/// Scan operation for retrieving all matching items from a table.
pub mod scan;
