//! Candidate selection, compatibility scoring and the match/connection state machine.

pub mod decision;
pub mod locks;
pub mod pair;
pub mod scorer;
pub mod selector;

pub use locks::PairLocks;
pub use pair::PairKey;
