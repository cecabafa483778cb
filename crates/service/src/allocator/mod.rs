//! Find-or-create association of a natural key (a name) to a canonical
//! identifier drawn from a bounded numeric space.
//!
//! The associator reuses the id already bound to a name when one exists and
//! otherwise draws random candidates, checking each against the record table
//! until a free one turns up or the attempt cap is hit. How concurrent
//! first-time callers for the same name are treated is decided by
//! [`configs::RacePolicy`].

pub mod candidates;
pub mod associator;

pub use associator::{Associator, AssociatorSettings, NameIndex, RecordTable};
pub use candidates::{CandidateSource, RandomCandidates};
