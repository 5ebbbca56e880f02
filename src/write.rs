//! Write operations against the member and team tables.
//!
//! - Putting new items or replacing existing ones
//! - Updating attributes of existing items
//! - Batch putting or deleting many items

/// Batch write item operation for putting or deleting many items.
pub mod batch_write_item;

/// Put item operation for creating or replacing items.
pub mod put_item;

/// Update item operation for modifying existing items.
pub mod update_item;
