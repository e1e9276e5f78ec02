//! Deductive reasoning engine for a networked Clue-playing agent: a
//! Knowledge Base tracking card-ownership belief, a fixed-point
//! Propagator, an optional Solution Enumerator, and the turn-time
//! Policy built on top of them. See `proto` for the wire glue that
//! drives an [`agent::Agent`] from a TCP connection.

pub mod agent;
pub mod bitset;
pub mod cards;
pub mod enumerator;
pub mod error;
pub mod kb;
pub mod policy;
pub mod propagator;
pub mod proto;
