//! Record types persisted in the key-value tables, plus the input
//! validation helpers the HTTP layer applies before calling services.

pub mod errors;
pub mod association;
pub mod competency;
