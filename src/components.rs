//! Incremental enumeration of strongly connected and maximal end components.
//!
//! [`EndComponents`] is an iterator that produces one component per call to
//! `next()`. The depth-first search behind it is Tarjan's algorithm written as
//! an explicit state machine (`TarjanSearch`), so it can stop as soon as a
//! component has been popped off the Tarjan stack and pick up exactly where it
//! left off on the next call.
//!
//! # Maximal end components
//!
//! In [`ComponentMode::Mec`] every SCC found is checked for closure. An SCC in
//! which some probabilistic node has a successor outside of it (or some
//! controlled node has none inside) is not an end component: those nodes are
//! removed, the removal is propagated backwards through the SCC, and the
//! surviving nodes are deferred to the next pass, which decomposes them again
//! from scratch with fresh DFS numbering.
//!
//! # Examples
//!
//! ```
//! use mec_rs::graph::MdpGraph;
//! use mec_rs::types::Role;
//!
//! // Two closed loops {0, 1} and {2, 3}, joined by the one-way edge 1 -> 2.
//! let graph = MdpGraph::from_adjacency([
//!     (Role::Probabilistic, vec![1]),
//!     (Role::Controlled, vec![0, 2]),
//!     (Role::Probabilistic, vec![3]),
//!     (Role::Controlled, vec![2]),
//! ]);
//!
//! let mecs: Vec<Vec<usize>> = graph.maximal_end_components().map(|c| c.to_vec()).collect();
//! assert_eq!(mecs, vec![vec![2, 3], vec![0, 1]]);
//! ```

use std::cmp::min;
use std::iter::FusedIterator;

use log::{debug, trace};

use crate::bitset::BitSet;
use crate::graph::MdpGraph;
use crate::types::{ComponentMode, Role};

/// Phase of the enumerator state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// No depth-first search in progress; the next root comes from the worklist.
    Idle,
    /// A depth-first search is suspended mid-way.
    Searching,
    /// A complete SCC has been popped and is being checked.
    Yielding,
    /// Every node has been consumed.
    Exhausted,
}

/// Counters collected while enumerating.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ComponentStats {
    /// Number of passes over the worklist (at least 1).
    pub passes: usize,
    /// Number of SCCs popped by the search.
    pub sccs: usize,
    /// Number of components returned.
    pub reported: usize,
    /// Number of single-node SCCs rejected in MEC mode.
    pub discarded: usize,
    /// Number of nodes removed as leaving in MEC mode.
    pub pruned: usize,
}

/// A suspended call of the depth-first search: the node being expanded and
/// the index of the next successor to look at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Frame {
    node: usize,
    cursor: usize,
}

/// Outcome of a single [`TarjanSearch::step`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Step {
    /// One edge was examined or one call returned.
    Advanced,
    /// A complete SCC was popped into the output buffer.
    Found,
    /// The call stack is empty.
    Idle,
}

/// Tarjan's SCC algorithm with an explicit call stack.
#[derive(Debug, Clone)]
pub(crate) struct TarjanSearch {
    current: Option<Frame>,
    calls: Vec<Frame>,
    next_index: usize,
    index: Vec<usize>,
    lowlink: Vec<usize>,
    stack: Vec<usize>,
    on_stack: BitSet,
    visited: BitSet,
}

impl TarjanSearch {
    pub(crate) fn new(num_nodes: usize) -> Self {
        Self {
            current: None,
            calls: Vec::new(),
            next_index: 0,
            index: vec![0; num_nodes],
            lowlink: vec![0; num_nodes],
            stack: Vec::new(),
            on_stack: BitSet::new(num_nodes),
            visited: BitSet::new(num_nodes),
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub(crate) fn is_visited(&self, node: usize) -> bool {
        self.visited.contains(node)
    }

    /// Forgets all DFS numbering. Only allowed between searches.
    pub(crate) fn reset_pass(&mut self) {
        assert!(self.is_idle(), "Cannot reset a search in progress");
        self.next_index = 0;
        self.visited.clear_all();
    }

    fn discover(&mut self, node: usize) {
        self.index[node] = self.next_index;
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);
        self.visited.insert(node);
    }

    /// Starts a new search from `root`.
    pub(crate) fn start(&mut self, root: usize) {
        assert!(self.is_idle(), "Search already in progress");
        assert!(!self.is_visited(root), "Root {} already visited in this pass", root);
        trace!("tarjan: root {}", root);
        self.discover(root);
        self.current = Some(Frame { node: root, cursor: 0 });
    }

    /// Advances the search by one edge or one return.
    ///
    /// Only successors in `existing` are followed. On [`Step::Found`] the
    /// popped SCC is in `scc`.
    pub(crate) fn step(&mut self, graph: &MdpGraph, existing: &BitSet, scc: &mut Vec<usize>) -> Step {
        let Some(frame) = self.current.as_mut() else {
            return Step::Idle;
        };
        let node = frame.node;
        let successors = graph.successors(node);

        if frame.cursor < successors.len() {
            let succ = successors[frame.cursor];
            frame.cursor += 1;
            let caller = *frame;
            if existing.contains(succ) {
                if !self.visited.contains(succ) {
                    trace!("tarjan: {} -> {} (tree)", node, succ);
                    self.calls.push(caller);
                    self.discover(succ);
                    self.current = Some(Frame { node: succ, cursor: 0 });
                } else if self.on_stack.contains(succ) {
                    self.lowlink[node] = min(self.lowlink[node], self.index[succ]);
                }
            }
            return Step::Advanced;
        }

        let found = self.lowlink[node] == self.index[node];
        if found {
            scc.clear();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                scc.push(member);
                if member == node {
                    break;
                }
            }
            trace!("tarjan: SCC of {} nodes rooted at {}", scc.len(), node);
        }

        self.current = self.calls.pop();
        if let Some(parent) = self.current {
            self.lowlink[parent.node] = min(self.lowlink[parent.node], self.lowlink[node]);
        }

        if found {
            Step::Found
        } else {
            Step::Advanced
        }
    }

    /// Steps until an SCC is found (returns true) or the search runs dry.
    pub(crate) fn run(&mut self, graph: &MdpGraph, existing: &BitSet, scc: &mut Vec<usize>) -> bool {
        loop {
            match self.step(graph, existing, scc) {
                Step::Advanced => {}
                Step::Found => return true,
                Step::Idle => return false,
            }
        }
    }
}

/// Resumable producer of components, see the [module documentation](self).
///
/// The enumerator owns the set of nodes still under consideration; it
/// shrinks as nodes are reported or pruned. Each returned [`BitSet`] is a
/// fresh value owned by the caller.
pub struct EndComponents<'a> {
    graph: &'a MdpGraph,
    mode: ComponentMode,
    existing: BitSet,
    todo: Vec<usize>,
    next_todo: Vec<usize>,
    search: TarjanSearch,
    scc: Vec<usize>,
    remaining: Vec<usize>,
    in_scc: BitSet,
    leaving: Vec<usize>,
    phase: Phase,
    stats: ComponentStats,
}

impl<'a> EndComponents<'a> {
    /// Creates an enumerator over the nodes in `existing`.
    pub fn new(graph: &'a MdpGraph, existing: BitSet, mode: ComponentMode) -> Self {
        assert_eq!(
            existing.universe(),
            graph.num_nodes(),
            "Node set universe does not match the graph"
        );
        let num_nodes = graph.num_nodes();
        let todo = existing.to_vec();
        debug!("end_components({}): {} nodes", mode, todo.len());
        Self {
            graph,
            mode,
            existing,
            todo,
            next_todo: Vec::new(),
            search: TarjanSearch::new(num_nodes),
            scc: Vec::new(),
            remaining: vec![0; num_nodes],
            in_scc: BitSet::new(num_nodes),
            leaving: Vec::new(),
            phase: Phase::Idle,
            stats: ComponentStats {
                passes: 1,
                ..ComponentStats::default()
            },
        }
    }

    pub fn mode(&self) -> ComponentMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &ComponentStats {
        &self.stats
    }

    /// Nodes neither reported nor pruned yet.
    pub fn remaining(&self) -> &BitSet {
        &self.existing
    }

    fn select_root(&mut self) -> bool {
        while let Some(node) = self.todo.pop() {
            if self.existing.contains(node) && !self.search.is_visited(node) {
                self.search.start(node);
                return true;
            }
        }
        false
    }

    fn compute_next(&mut self) -> Option<BitSet> {
        loop {
            if self.search.is_idle() {
                self.phase = Phase::Idle;
                if !self.select_root() {
                    if self.next_todo.is_empty() {
                        assert!(
                            self.existing.is_empty(),
                            "Enumeration stalled with {} unconsumed nodes (first: {:?})",
                            self.existing.len(),
                            self.existing.next_set_bit(0)
                        );
                        self.phase = Phase::Exhausted;
                        debug!("end_components({}): done, {:?}", self.mode, self.stats);
                        return None;
                    }
                    std::mem::swap(&mut self.todo, &mut self.next_todo);
                    self.search.reset_pass();
                    self.stats.passes += 1;
                    debug!(
                        "end_components({}): pass {} over {} deferred nodes",
                        self.mode,
                        self.stats.passes,
                        self.todo.len()
                    );
                    continue;
                }
            }

            self.phase = Phase::Searching;
            if !self.search.run(self.graph, &self.existing, &mut self.scc) {
                continue;
            }

            self.phase = Phase::Yielding;
            self.stats.sccs += 1;
            let reported = match self.mode {
                ComponentMode::Scc => {
                    for &node in &self.scc {
                        self.existing.remove(node);
                    }
                    true
                }
                ComponentMode::Mec => self.check_mec(),
            };
            self.phase = if self.search.is_idle() {
                Phase::Idle
            } else {
                Phase::Searching
            };

            if reported {
                self.stats.reported += 1;
                debug!("end_components({}): component of {} nodes", self.mode, self.scc.len());
                return Some(BitSet::from_indices(self.graph.num_nodes(), self.scc.iter().copied()));
            }
        }
    }

    /// Decides whether the SCC in `self.scc` is an end component.
    ///
    /// Consumed nodes leave `existing`. If the SCC is not closed, its leaving
    /// nodes are pruned and the survivors go to `next_todo`.
    fn check_mec(&mut self) -> bool {
        let graph = self.graph;

        if let [node] = self.scc[..] {
            self.existing.remove(node);
            let successors = graph.successors(node);
            let closed = successors.is_empty()
                || match graph.role(node) {
                    Role::Controlled => successors.contains(&node),
                    Role::Probabilistic => successors.iter().all(|&succ| succ == node),
                };
            if !closed {
                trace!("check_mec: discarding single node {}", node);
                self.stats.discarded += 1;
            }
            return closed;
        }

        for &node in &self.scc {
            self.in_scc.insert(node);
        }

        self.leaving.clear();
        for &node in &self.scc {
            let successors = graph.successors(node);
            let leaves = match graph.role(node) {
                Role::Probabilistic => successors.iter().any(|&succ| !self.in_scc.contains(succ)),
                Role::Controlled => !successors.iter().any(|&succ| self.in_scc.contains(succ)),
            };
            if leaves {
                self.leaving.push(node);
                self.existing.remove(node);
            }
        }

        let closed = self.leaving.is_empty();
        if closed {
            for &node in &self.scc {
                self.existing.remove(node);
            }
        } else {
            let seeds = self.leaving.len();
            graph.init_remaining(self.scc.iter().copied(), &self.in_scc, &mut self.remaining);
            let propagated = graph.propagate_leaving(
                &mut self.existing,
                Some(&self.in_scc),
                &mut self.remaining,
                &mut self.leaving,
            );
            self.stats.pruned += seeds + propagated;

            let before = self.next_todo.len();
            for &node in &self.scc {
                if self.existing.contains(node) {
                    self.next_todo.push(node);
                }
            }
            debug!(
                "check_mec: SCC of {} nodes not closed, {} leaving, {} deferred",
                self.scc.len(),
                seeds + propagated,
                self.next_todo.len() - before
            );
        }

        for &node in &self.scc {
            self.in_scc.remove(node);
        }
        closed
    }
}

impl Iterator for EndComponents<'_> {
    type Item = BitSet;

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase == Phase::Exhausted {
            return None;
        }
        self.compute_next()
    }
}

impl FusedIterator for EndComponents<'_> {}

impl MdpGraph {
    /// Enumerates components of the subgraph induced by `existing`.
    pub fn end_components(&self, existing: BitSet, mode: ComponentMode) -> EndComponents<'_> {
        EndComponents::new(self, existing, mode)
    }

    /// Enumerates the maximal end components of the whole graph.
    pub fn maximal_end_components(&self) -> EndComponents<'_> {
        self.end_components(self.all_nodes(), ComponentMode::Mec)
    }

    pub fn maximal_end_components_within(&self, existing: BitSet) -> EndComponents<'_> {
        self.end_components(existing, ComponentMode::Mec)
    }

    /// Enumerates the strongly connected components of the whole graph.
    pub fn strongly_connected_components(&self) -> EndComponents<'_> {
        self.end_components(self.all_nodes(), ComponentMode::Scc)
    }

    pub fn strongly_connected_components_within(&self, existing: BitSet) -> EndComponents<'_> {
        self.end_components(existing, ComponentMode::Scc)
    }
}
