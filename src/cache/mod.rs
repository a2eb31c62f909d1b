//! Cache module for persisting values to disk
//!
//! This module provides a cache manager that persists named JSON values to the
//! filesystem, and the single-value slot abstraction the weather cache reads
//! and writes through. Slots are replaced wholesale; there is no partial update.

mod manager;
mod slot;

pub use manager::{CacheManager, PersistenceError};
pub use slot::{FileSlot, MemorySlot, SlotStore};
