//! Pattern compilation.
//!
//! [`parse`] turns a pattern string into a ready-to-run
//! [`FiniteStateMachine`](crate::automaton::FiniteStateMachine): the
//! recursive-descent parser emits NFA states, transitions and capture-group
//! boundaries straight into the automaton builder, and building the machine
//! derives the DFA. Compilation either succeeds completely or fails with a
//! [`ParseError`]; the match engine itself never raises one.

mod parser;

pub use parser::{parse, ParseError, ParseErrorKind};
