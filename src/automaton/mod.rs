//! Automaton compilation and execution.
//!
//! The pieces, in the order data flows through them:
//!
//! - `state_set`: canonical set-of-states values used as vertices
//! - `fsm`: the epsilon-NFA builder and the eager NFA-to-DFA subset
//!   construction with pluggable epsilon/merge policies
//! - `tape`: a rewindable forward cursor over the input symbols
//! - `matching`: the scanning matcher that walks the DFA and reports named
//!   capture-group spans

mod fsm;
mod matching;
mod state_set;
mod tape;

pub use fsm::{
    default_epsilon, default_merge, Automaton, Builder, EpsilonPolicy, FiniteStateMachine, Group,
    MergePolicy, NfaPath,
};
pub use matching::{Match, Matches, MAIN_GROUP};
pub use state_set::StateSet;
pub use tape::InputTape;
