//! Storage abstractions for service layer
//!
//! `KeyValueStore` is the table contract every service consumes: point
//! lookups, filtered scans and single-item writes keyed by a string primary
//! key. Two backends ship with the crate, a JSON file per table and a purely
//! in-memory map.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod json_map_store;
pub mod memory;

pub use json_map_store::JsonMapStore;
pub use memory::MemoryStore;

/// Predicate applied by `scan`.
pub type ScanFilter<'a, V> = &'a (dyn Fn(&V) -> bool + Send + Sync);

#[async_trait]
pub trait KeyValueStore<V>: Send + Sync
where
    V: Send + Sync + 'static,
{
    /// All records matching `filter`, as a complete result set in ascending key order.
    async fn scan(&self, filter: ScanFilter<'_, V>) -> Result<Vec<(String, V)>, ServiceError>;

    async fn get(&self, key: &str) -> Result<Option<V>, ServiceError>;

    /// Unconditional upsert.
    async fn put(&self, key: String, value: V) -> Result<(), ServiceError>;

    /// Write only if `key` is unoccupied; returns whether the write happened.
    async fn put_if_absent(&self, key: String, value: V) -> Result<bool, ServiceError>;

    /// Remove `key`; returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, ServiceError>;
}
