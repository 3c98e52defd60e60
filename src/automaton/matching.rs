//! The scanning match engine.
//!
//! Walks the DFA over an input tape, tracking for every capture group the
//! earliest offset its entry state joined the current vertex and the latest
//! offset its exit state was still a member. Scanning is greedy and
//! non-overlapping: each attempt extends as far as transitions allow, the
//! last sighting of the whole-match group's exit state closes the match,
//! and the scan resumes at the match end.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::fsm::{Automaton, FiniteStateMachine};
use super::tape::InputTape;

/// Reserved name of the capture group spanning the entire pattern. A match
/// attempt succeeds only when this group's exit state has been observed.
pub const MAIN_GROUP: &str = "G0";

/// A half-open span `[start, end)` over input-sequence offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl<S, Y> FiniteStateMachine<S, Y>
where
    S: Clone + Ord + Hash,
    Y: Clone + Ord + Hash,
{
    /// The leftmost match, as a map from group name to span, or `None` if
    /// the input contains no match at all.
    pub fn evaluate<T>(&self, inputs: T) -> Option<FxHashMap<String, Match>>
    where
        T: IntoIterator<Item = Y>,
    {
        self.evaluate_all(inputs).next()
    }

    /// All non-overlapping matches, left to right, as a lazy iterator.
    ///
    /// Inputs outside the automaton's alphabet simply never match; they are
    /// not an error.
    pub fn evaluate_all<T>(&self, inputs: T) -> Matches<'_, S, Y, T::IntoIter>
    where
        T: IntoIterator<Item = Y>,
    {
        Matches {
            fsm: self,
            tape: InputTape::new(inputs),
            scan: 0,
        }
    }

    /// One match attempt starting at tape offset `at`.
    ///
    /// Returns the number of symbols the match spans and the group map with
    /// absolute offsets. Group observations are snapshotted each time the
    /// main group's exit state appears, so extending past the last viable
    /// end (greedy scanning always runs until no transition exists) cannot
    /// leak later observations into the reported spans.
    fn match_at<I>(
        &self,
        tape: &mut InputTape<Y, I>,
        at: usize,
    ) -> Option<(usize, FxHashMap<String, Match>)>
    where
        I: Iterator<Item = Y>,
    {
        let mut vertex = self.dfa_start();
        let mut begins: FxHashMap<&str, usize> = FxHashMap::default();
        let mut ends: FxHashMap<&str, usize> = FxHashMap::default();
        let mut snapshot: Option<(usize, FxHashMap<&str, usize>, FxHashMap<&str, usize>)> = None;
        let mut offset = 0usize;

        loop {
            let mut main_exit_here = false;
            for (name, group) in self.groups() {
                if vertex.contains(&group.start) {
                    begins.entry(name.as_str()).or_insert(offset);
                }
                if vertex.contains(&group.end) {
                    ends.insert(name.as_str(), offset);
                    if name == MAIN_GROUP {
                        main_exit_here = true;
                    }
                }
            }
            if main_exit_here {
                snapshot = Some((offset, begins.clone(), ends.clone()));
            }

            match self.transition(vertex, tape) {
                Some(next) => {
                    vertex = next;
                    offset += 1;
                }
                None => break,
            }
        }

        let (main_end, begins, ends) = snapshot?;
        let mut result = FxHashMap::default();
        for (name, end) in ends {
            let Some(&begin) = begins.get(name) else {
                continue;
            };
            if begin > end {
                continue;
            }
            result.insert(
                name.to_string(),
                Match {
                    start: at + begin,
                    end: at + end,
                },
            );
        }
        Some((main_end, result))
    }
}

/// Lazy iterator over the non-overlapping matches of one input sequence.
/// Produced by [`FiniteStateMachine::evaluate_all`]; forward-only and
/// non-restartable.
pub struct Matches<'m, S, Y, I> {
    fsm: &'m FiniteStateMachine<S, Y>,
    tape: InputTape<Y, I>,
    scan: usize,
}

impl<S, Y, I> Iterator for Matches<'_, S, Y, I>
where
    S: Clone + Ord + Hash,
    Y: Clone + Ord + Hash,
    I: Iterator<Item = Y>,
{
    type Item = FxHashMap<String, Match>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.tape.seek(self.scan);
            // no symbol at the scan offset: the input is exhausted
            self.tape.peek()?;

            if let Some((span, groups)) = self.fsm.match_at(&mut self.tape, self.scan) {
                // a zero-width match still advances the scan by one symbol
                self.scan += span.max(1);
                return Some(groups);
            }
            self.scan += 1;
        }
    }
}
