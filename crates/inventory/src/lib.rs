//! Inventory domain module.
//!
//! This crate contains business rules for warehouse stock, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{InventoryItem, InventoryItemId, InventoryItemPatch, NewInventoryItem};
