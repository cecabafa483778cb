//! Service layer over the key-value tables.
//! - `allocator`: find-or-create association with collision-free id allocation.
//! - `competency_service`: read/delete competencies.
//! - `seed`: batch loading of JSON items.
//! - `storage`: the table contract and its backends.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod allocator;
pub mod competency_service;
pub mod pagination;
pub mod seed;
pub mod observability;
