//! NFA/DFA state tables over a byte alphabet: Thompson-style construction,
//! subset construction (determinization) and partition-refinement
//! minimization.
//!
//! States are dense integer ids, never pointers, so each automaton is one
//! owning value with no intrusive graph to walk on drop.

pub mod dfa;
pub mod label;
pub mod matching;
pub mod minimize;
pub mod nfa;
pub mod table;

pub use dfa::{DFAFromNFA, DFA};
pub use label::ByteClass;
pub use matching::Match;
pub use minimize::minimize;
pub use nfa::NFA;
pub use table::{Table, Transition};
