//! Aho-Corasick automaton over codepoints.
//!
//! One trie holds the literal operands of every registered rule; operands
//! that share a prefix share states, and identical operands from different
//! rules end on the same state and accumulate in its output list.
//!
//! # Module Organization
//!
//! - `arena`: state storage, trie insertion, and the scan step
//! - `compile`: failure links and output propagation

mod arena;
mod compile;

pub use arena::{Automaton, State, StateId};
