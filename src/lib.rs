//! regroup: a regular-expression engine with named capture groups.
//!
//! A pattern is compiled by a recursive-descent parser into an epsilon-NFA
//! (Thompson construction), determinized once by subset construction, and
//! executed by a scanning matcher that walks the DFA and reports, for each
//! non-overlapping match, the span of every capture group it crossed.
//!
//! ```
//! use regroup::{compile, MAIN_GROUP};
//!
//! let fsm = compile("(?<word>[a-c]+)").unwrap();
//! let groups = fsm.evaluate("xx-abc-".chars()).unwrap();
//! assert_eq!(groups[MAIN_GROUP].start, 3);
//! assert_eq!(groups["word"].start, 3);
//! assert_eq!(groups["word"].end, 6);
//! ```
//!
//! Machines are immutable once built and safe to share across threads:
//! every `evaluate*` call keeps its scanning state to itself. The pieces
//! (the generic [`graph`], the [`automaton`] compiler with its pluggable
//! epsilon/merge policies, and the [`regexp`] front end) are public, so
//! machines can also be assembled directly for symbol and state types of
//! your own.

pub mod automaton;
pub mod graph;
pub mod regexp;

pub use automaton::{
    Automaton, FiniteStateMachine, Group, InputTape, Match, Matches, StateSet, MAIN_GROUP,
};
pub use regexp::{ParseError, ParseErrorKind};

/// Compile a pattern into a [`FiniteStateMachine`] over `char` symbols.
pub fn compile(pattern: &str) -> Result<FiniteStateMachine<u32, char>, ParseError> {
    regexp::parse(pattern)
}
