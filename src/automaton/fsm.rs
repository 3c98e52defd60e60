//! The finite-state machine: an epsilon-NFA plus its determinization.
//!
//! An NFA is assembled incrementally through the builder; nondeterminism is
//! expressed by vertices that are *sets* of states, so a vertex may itself
//! represent "one of several states". `build()` freezes the NFA and derives
//! the equivalent DFA once, by subset construction over epsilon closures.
//! The machine is immutable afterwards and safe to share across threads.
//!
//! What counts as a non-consuming edge, and how same-symbol transitions
//! merge during determinization, are injectable policies; the defaults
//! treat the `None` edge label as epsilon and union destination state-sets
//! per symbol.

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::graph::{Graph, GraphBuilder, Path};

use super::state_set::StateSet;
use super::tape::InputTape;

/// A path through an epsilon-NFA: vertices are state-sets, the `None` label
/// is the epsilon sentinel.
pub type NfaPath<S, Y> = Path<StateSet<S>, Option<Y>>;

/// Decides whether an NFA path is non-consuming.
pub type EpsilonPolicy<S, Y> = Box<dyn Fn(&NfaPath<S, Y>) -> bool + Send + Sync>;

/// Folds one consuming NFA path into the per-symbol destination accumulator
/// of a DFA vertex under construction.
pub type MergePolicy<S, Y> = Box<dyn Fn(&mut FxHashMap<Y, StateSet<S>>, NfaPath<S, Y>) + Send + Sync>;

/// Default epsilon policy: the edge is the `None` sentinel.
pub fn default_epsilon<S, Y>(path: &NfaPath<S, Y>) -> bool {
    path.edge.is_none()
}

/// Default merge policy: union destination state-sets per symbol; epsilon
/// paths contribute nothing.
pub fn default_merge<S, Y>(results: &mut FxHashMap<Y, StateSet<S>>, path: NfaPath<S, Y>)
where
    S: Clone + Ord,
    Y: Clone + Eq + Hash,
{
    let Some(symbol) = path.edge else {
        return;
    };
    results.entry(symbol).or_default().union_with(&path.end);
}

/// A named capture boundary: the NFA states whose visitation marks where
/// the group's span opens and closes. Declared against original NFA states,
/// never DFA vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<S> {
    pub start: S,
    pub end: S,
}

/// The single-step execution primitive of a deterministic automaton.
pub trait Automaton<S, Y> {
    /// Read one symbol from the tape and follow the matching edge out of
    /// `vertex`. `None` when the tape is exhausted or no edge exists.
    fn transition<'a, I>(
        &'a self,
        vertex: &StateSet<S>,
        tape: &mut InputTape<Y, I>,
    ) -> Option<&'a StateSet<S>>
    where
        I: Iterator<Item = Y>;
}

/// A compiled automaton: the epsilon-NFA it was built from, its capture
/// groups, and the DFA derived at construction time.
pub struct FiniteStateMachine<S, Y> {
    nfa_start: StateSet<S>,
    nfa: Graph<StateSet<S>, Option<Y>>,
    groups: FxHashMap<String, Group<S>>,
    dfa_start: StateSet<S>,
    dfa: Graph<StateSet<S>, Y>,
    is_epsilon: EpsilonPolicy<S, Y>,
    merge: MergePolicy<S, Y>,
}

impl<S, Y> FiniteStateMachine<S, Y>
where
    S: Clone + Ord + Hash + 'static,
    Y: Clone + Ord + Hash + 'static,
{
    /// Start building a machine whose NFA grows from `initial`.
    pub fn new(initial: S) -> Builder<S, Y> {
        Builder::new(initial)
    }
}

impl<S, Y> FiniteStateMachine<S, Y>
where
    S: Clone + Ord + Hash,
    Y: Clone + Ord + Hash,
{
    pub fn nfa_start(&self) -> &StateSet<S> {
        &self.nfa_start
    }

    pub fn nfa(&self) -> &Graph<StateSet<S>, Option<Y>> {
        &self.nfa
    }

    pub fn groups(&self) -> &FxHashMap<String, Group<S>> {
        &self.groups
    }

    pub fn dfa_start(&self) -> &StateSet<S> {
        &self.dfa_start
    }

    pub fn dfa(&self) -> &Graph<StateSet<S>, Y> {
        &self.dfa
    }

    /// The set of states reachable from `starts` through non-consuming
    /// edges only, per the machine's epsilon policy.
    pub fn epsilon_closure(&self, starts: &StateSet<S>) -> StateSet<S> {
        epsilon_closure(&self.nfa, &self.is_epsilon, starts)
    }

    pub fn epsilon_policy(&self) -> &EpsilonPolicy<S, Y> {
        &self.is_epsilon
    }

    pub fn merge_policy(&self) -> &MergePolicy<S, Y> {
        &self.merge
    }
}

impl<S, Y> Automaton<S, Y> for FiniteStateMachine<S, Y>
where
    S: Clone + Ord + Hash,
    Y: Clone + Ord + Hash,
{
    fn transition<'a, I>(
        &'a self,
        vertex: &StateSet<S>,
        tape: &mut InputTape<Y, I>,
    ) -> Option<&'a StateSet<S>>
    where
        I: Iterator<Item = Y>,
    {
        let input = tape.next()?;
        self.dfa.edge_target(vertex, &input)
    }
}

// Policies are deliberately left out of equality: two machines are the same
// machine if their graphs, start sets and groups agree.
impl<S, Y> PartialEq for FiniteStateMachine<S, Y>
where
    S: Clone + Ord + Hash,
    Y: Clone + Ord + Hash,
{
    fn eq(&self, other: &Self) -> bool {
        self.nfa_start == other.nfa_start
            && self.nfa == other.nfa
            && self.groups == other.groups
            && self.dfa_start == other.dfa_start
            && self.dfa == other.dfa
    }
}

impl<S, Y> fmt::Debug for FiniteStateMachine<S, Y>
where
    S: fmt::Debug,
    Y: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiniteStateMachine")
            .field("nfa_start", &self.nfa_start)
            .field("nfa", &self.nfa)
            .field("groups", &self.groups)
            .field("dfa_start", &self.dfa_start)
            .field("dfa", &self.dfa)
            .finish_non_exhaustive()
    }
}

/// Accumulates NFA edges, capture groups and policies, then freezes the
/// machine with a one-time [`Builder::build`].
pub struct Builder<S, Y> {
    initial: S,
    nfa: GraphBuilder<StateSet<S>, Option<Y>>,
    groups: FxHashMap<String, Group<S>>,
    is_epsilon: EpsilonPolicy<S, Y>,
    merge: MergePolicy<S, Y>,
}

impl<S, Y> Builder<S, Y>
where
    S: Clone + Ord + Hash + 'static,
    Y: Clone + Ord + Hash + 'static,
{
    fn new(initial: S) -> Self {
        let mut nfa = GraphBuilder::new();
        nfa.ensure_vertex(StateSet::singleton(initial.clone()));
        Builder {
            initial,
            nfa,
            groups: FxHashMap::default(),
            is_epsilon: Box::new(default_epsilon),
            merge: Box::new(default_merge),
        }
    }

    /// Add the transition `start -symbol-> end` (`None` = epsilon).
    ///
    /// A transition that shares its origin and label with an earlier one is
    /// folded in: the destination vertex becomes the union of the target
    /// states, which is how nondeterminism enters the graph.
    pub fn path(&mut self, start: S, symbol: Option<Y>, end: S) -> &mut Self {
        let starts = StateSet::singleton(start);
        let mut ends = self
            .nfa
            .edge_target(&starts, &symbol)
            .cloned()
            .unwrap_or_default();
        ends.insert(end.clone());
        self.nfa.path(starts, symbol, ends);
        self.nfa.ensure_vertex(StateSet::singleton(end));
        self
    }

    /// Declare a capture group over a pair of NFA states.
    pub fn group(&mut self, name: impl Into<String>, start: S, end: S) -> &mut Self {
        self.groups.insert(name.into(), Group { start, end });
        self
    }

    /// Override what counts as a non-consuming edge.
    pub fn with_epsilon<F>(&mut self, policy: F) -> &mut Self
    where
        F: Fn(&NfaPath<S, Y>) -> bool + Send + Sync + 'static,
    {
        self.is_epsilon = Box::new(policy);
        self
    }

    /// Override how same-symbol transitions merge during determinization.
    pub fn with_merge<F>(&mut self, policy: F) -> &mut Self
    where
        F: Fn(&mut FxHashMap<Y, StateSet<S>>, NfaPath<S, Y>) + Send + Sync + 'static,
    {
        self.merge = Box::new(policy);
        self
    }

    /// Freeze the NFA and derive the DFA.
    ///
    /// Worklist subset construction: seed with the epsilon closure of the
    /// start set; for each candidate vertex not yet finalized, merge the
    /// consuming paths out of its closure into a per-symbol destination table
    /// (destinations epsilon-closed before merging), enqueue every
    /// destination, and record the table as the vertex's DFA row.
    /// Terminates because the reachable subsets of a finite state space are
    /// finite.
    pub fn build(self) -> FiniteStateMachine<S, Y> {
        let Builder {
            initial,
            nfa,
            groups,
            is_epsilon,
            merge,
        } = self;
        let nfa = nfa.build();
        let nfa_start = StateSet::singleton(initial);

        let dfa_start = epsilon_closure(&nfa, &is_epsilon, &nfa_start);
        let mut dfa = GraphBuilder::new();
        let mut queue: VecDeque<StateSet<S>> = VecDeque::new();
        queue.push_back(dfa_start.clone());

        while let Some(vertex) = queue.pop_front() {
            if dfa.contains_vertex(&vertex) {
                continue;
            }

            let closed = epsilon_closure(&nfa, &is_epsilon, &vertex);
            let singletons: Vec<StateSet<S>> =
                closed.iter().cloned().map(StateSet::singleton).collect();

            let mut reachable: FxHashMap<Y, StateSet<S>> = FxHashMap::default();
            for path in nfa.paths(singletons.iter(), |p| !is_epsilon(p)) {
                let end = epsilon_closure(&nfa, &is_epsilon, &path.end);
                merge(
                    &mut reachable,
                    Path {
                        start: path.start,
                        edge: path.edge,
                        end,
                    },
                );
            }

            queue.extend(reachable.values().cloned());
            dfa.set_edges(vertex, reachable.into_iter().collect());
        }

        FiniteStateMachine {
            nfa_start,
            nfa,
            groups,
            dfa_start,
            dfa: dfa.build(),
            is_epsilon,
            merge,
        }
    }
}

/// Epsilon closure of a state-set: graph closure over singleton vertices,
/// restricted to epsilon paths, flattened back into one set.
fn epsilon_closure<S, Y>(
    nfa: &Graph<StateSet<S>, Option<Y>>,
    is_epsilon: &EpsilonPolicy<S, Y>,
    starts: &StateSet<S>,
) -> StateSet<S>
where
    S: Clone + Ord + Hash,
    Y: Clone + Ord + Hash,
{
    let singletons: Vec<StateSet<S>> = starts.iter().cloned().map(StateSet::singleton).collect();
    let closed = nfa.closure_with(singletons, |path| {
        if is_epsilon(path) {
            path.end.iter().cloned().map(StateSet::singleton).collect()
        } else {
            Vec::new()
        }
    });
    closed.into_iter().flatten().collect()
}
