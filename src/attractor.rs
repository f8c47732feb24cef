//! Qualitative reachability on MDP state graphs.
//!
//! All operations are backward fixpoints over the predecessor relation:
//!
//! - [`MdpGraph::reach_pre`] computes the nodes that reach a target set with
//!   positive probability or almost surely, under a minimizing or maximizing
//!   scheduler.
//! - [`MdpGraph::reach_max_one`] is the classical two-level fixpoint for
//!   `Pmax = 1` ("Prob1E").
//! - [`MdpGraph::remove_leaving_attr`] and [`MdpGraph::remove_leaving`] shrink a
//!   node set to the part from which no node is forced to leave it.
//!
//! # Counters
//!
//! The positive-probability fixpoint keeps one counter per node: the number of
//! successor edges that still have to reach the target before the node is
//! included. Controlled nodes need all of them under [`Scheduler::Min`] and
//! one under [`Scheduler::Max`]; probabilistic nodes always need one.
//! Leaving-state removal runs the same scheme backwards: a controlled node is
//! removed once all its successors inside the set are gone, a probabilistic
//! node as soon as one of them is.
//!
//! # Almost-sure reachability
//!
//! `Pmin = 1` is reduced to two positive-probability computations:
//!
//! ```text
//! some   = reach(target, nodes, dir, P>0)
//! none   = reach(nodes \ some, nodes \ target, flip(dir), P>0)
//! result = nodes \ none
//! ```

use log::debug;

use crate::bitset::BitSet;
use crate::graph::MdpGraph;
use crate::types::{Objective, Role, Scheduler};

impl MdpGraph {
    fn check_set(&self, set: &BitSet) {
        assert_eq!(
            set.universe(),
            self.num_nodes(),
            "Node set universe does not match the graph"
        );
    }

    /// Computes the nodes of `nodes` that reach `target`.
    ///
    /// Only predecessors inside `nodes` are ever added; target nodes are part
    /// of the positive-probability result regardless of `nodes`.
    pub fn reach_pre(
        &self,
        target: &BitSet,
        nodes: &BitSet,
        scheduler: Scheduler,
        objective: Objective,
    ) -> BitSet {
        self.check_set(target);
        self.check_set(nodes);
        match (scheduler, objective) {
            (_, Objective::Positive) => self.reach_positive(target, nodes, scheduler),
            (Scheduler::Max, Objective::AlmostSure) => self.reach_max_one_within(target, nodes),
            (Scheduler::Min, Objective::AlmostSure) => {
                let some = self.reach_positive(target, nodes, scheduler);
                let mut avoid = nodes.clone();
                avoid.difference_with(&some);
                let mut outside_target = nodes.clone();
                outside_target.difference_with(target);
                let none = self.reach_positive(&avoid, &outside_target, scheduler.flip());
                let mut result = nodes.clone();
                result.difference_with(&none);
                debug!(
                    "reach_pre(min, P=1): some = {}, none = {}, result = {}",
                    some.len(),
                    none.len(),
                    result.len()
                );
                result
            }
        }
    }

    /// Same as [`reach_pre`](Self::reach_pre) over all nodes of the graph.
    pub fn reach_pre_all(&self, target: &BitSet, scheduler: Scheduler, objective: Objective) -> BitSet {
        match (scheduler, objective) {
            (Scheduler::Max, Objective::AlmostSure) => self.reach_max_one(target),
            _ => self.reach_pre(target, &self.all_nodes(), scheduler, objective),
        }
    }

    fn reach_positive(&self, target: &BitSet, nodes: &BitSet, scheduler: Scheduler) -> BitSet {
        self.compute_predecessors();

        let mut remaining: Vec<usize> = (0..self.num_nodes())
            .map(|node| match self.role(node) {
                Role::Controlled if scheduler.is_min() => self.out_degree(node),
                Role::Controlled | Role::Probabilistic => 1,
            })
            .collect();

        let mut contained = target.clone();
        for node in target {
            remaining[node] = 0;
        }

        let mut frontier = target.to_vec();
        let mut waves = 0;
        while !frontier.is_empty() {
            waves += 1;
            let mut next = Vec::new();
            for &node in &frontier {
                for &pred in self.predecessors(node) {
                    if !nodes.contains(pred) || contained.contains(pred) {
                        continue;
                    }
                    assert!(remaining[pred] > 0, "Counter of node {} underflowed", pred);
                    remaining[pred] -= 1;
                    if remaining[pred] == 0 {
                        contained.insert(pred);
                        next.push(pred);
                    }
                }
            }
            frontier = next;
        }

        debug!(
            "reach_pre({}, P>0): |target| = {}, |result| = {} after {} waves",
            scheduler,
            target.len(),
            contained.len(),
            waves
        );
        contained
    }

    /// Computes the nodes from which some scheduler reaches `target` with probability one.
    pub fn reach_max_one(&self, target: &BitSet) -> BitSet {
        self.reach_max_one_within(target, &self.all_nodes())
    }

    /// Like [`reach_max_one`](Self::reach_max_one), adding only nodes of `nodes`.
    ///
    /// The outer variable `R` starts as `nodes` and shrinks; the inner one
    /// grows backwards from `target`. A controlled predecessor joins the inner
    /// set unconditionally, a probabilistic one only if all of its successors
    /// lie in `R`.
    pub fn reach_max_one_within(&self, target: &BitSet, nodes: &BitSet) -> BitSet {
        self.check_set(target);
        self.check_set(nodes);
        self.compute_predecessors();

        let mut outer = nodes.clone();
        outer.union_with(target);
        let mut iterations = 0;
        loop {
            iterations += 1;
            let mut inner = target.clone();
            let mut frontier = target.to_vec();
            while let Some(node) = frontier.pop() {
                for &pred in self.predecessors(node) {
                    if inner.contains(pred) || !nodes.contains(pred) {
                        continue;
                    }
                    let include = match self.role(pred) {
                        Role::Controlled => true,
                        Role::Probabilistic => self.successors(pred).iter().all(|&succ| outer.contains(succ)),
                    };
                    if include {
                        inner.insert(pred);
                        frontier.push(pred);
                    }
                }
            }
            debug!(
                "reach_max_one: iteration {}, |R| = {}, |R'| = {}",
                iterations,
                outer.len(),
                inner.len()
            );
            if inner == outer {
                return outer;
            }
            outer = inner;
        }
    }

    /// Computes the nodes from which every scheduler reaches `target` with probability one.
    pub fn reach_min_one(&self, target: &BitSet) -> BitSet {
        self.reach_pre(target, &self.all_nodes(), Scheduler::Min, Objective::AlmostSure)
    }

    /// Initializes leaving counters for `nodes` relative to `scope`.
    pub(crate) fn init_remaining(
        &self,
        nodes: impl IntoIterator<Item = usize>,
        scope: &BitSet,
        remaining: &mut [usize],
    ) {
        for node in nodes {
            remaining[node] = match self.role(node) {
                Role::Controlled => self.successors(node).iter().filter(|&&succ| scope.contains(succ)).count(),
                Role::Probabilistic => 1,
            };
        }
    }

    /// Propagates removal of the nodes in `leaving` backwards through `existing`.
    ///
    /// Seeds must already be absent from `existing`. With a `scope`, only
    /// predecessors inside it are touched. Returns the number of removed nodes.
    pub(crate) fn propagate_leaving(
        &self,
        existing: &mut BitSet,
        scope: Option<&BitSet>,
        remaining: &mut [usize],
        leaving: &mut Vec<usize>,
    ) -> usize {
        self.compute_predecessors();
        let mut removed = 0;
        while let Some(node) = leaving.pop() {
            for &pred in self.predecessors(node) {
                if !existing.contains(pred) || scope.is_some_and(|scope| !scope.contains(pred)) {
                    continue;
                }
                assert!(remaining[pred] > 0, "Counter of node {} underflowed", pred);
                remaining[pred] -= 1;
                if remaining[pred] == 0 {
                    existing.remove(pred);
                    leaving.push(pred);
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Shrinks `set` to its greatest closed subset.
    ///
    /// In the result every probabilistic node has all of its successors in the
    /// set and every controlled node has at least one.
    pub fn remove_leaving_attr(&self, set: &mut BitSet) {
        self.check_set(set);
        let mut remaining = vec![0; self.num_nodes()];
        self.init_remaining(set.iter(), set, &mut remaining);

        let mut leaving: Vec<usize> = set
            .iter()
            .filter(|&node| match self.role(node) {
                Role::Controlled => remaining[node] == 0,
                Role::Probabilistic => self.successors(node).iter().any(|&succ| !set.contains(succ)),
            })
            .collect();
        for &node in &leaving {
            set.remove(node);
        }
        let seeds = leaving.len();
        let removed = self.propagate_leaving(set, None, &mut remaining, &mut leaving);
        debug!(
            "remove_leaving_attr: {} seeds, {} propagated, {} left",
            seeds,
            removed,
            set.len()
        );
    }

    /// Removes `leaving` and everything forced towards it from the full node set.
    ///
    /// Counters are taken over the whole graph, so a controlled node disappears
    /// once all of its successors are gone and a probabilistic node once any is.
    pub fn remove_leaving(&self, leaving: &[usize]) -> BitSet {
        let all = self.all_nodes();
        let mut remaining = vec![0; self.num_nodes()];
        self.init_remaining(0..self.num_nodes(), &all, &mut remaining);

        let mut existing = all;
        let mut queue = Vec::with_capacity(leaving.len());
        for &node in leaving {
            if existing.remove(node) {
                queue.push(node);
            }
        }
        self.propagate_leaving(&mut existing, None, &mut remaining, &mut queue);
        existing
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// `0` chooses between `1 -> 3` (target) and the trap `2`.
    fn diamond() -> MdpGraph {
        MdpGraph::from_adjacency([
            (Role::Controlled, vec![1, 2]),
            (Role::Controlled, vec![3]),
            (Role::Controlled, vec![2]),
            (Role::Controlled, vec![3]),
        ])
    }

    /// `0 -> 1`, and `1` flips a coin between the target `2` and the sink `3`.
    fn gamble() -> MdpGraph {
        MdpGraph::from_adjacency([
            (Role::Controlled, vec![1]),
            (Role::Probabilistic, vec![2, 3]),
            (Role::Controlled, vec![2]),
            (Role::Controlled, vec![3]),
        ])
    }

    fn set(universe: usize, indices: &[usize]) -> BitSet {
        BitSet::from_indices(universe, indices.iter().copied())
    }

    #[test]
    fn test_chain_max_one() {
        let k = 9;
        let graph = MdpGraph::from_adjacency((0..=k).map(|i| (Role::Controlled, vec![(i + 1).min(k)])));
        let target = set(k + 1, &[k]);
        let result = graph.reach_max_one(&target);
        assert_eq!(result, graph.all_nodes());
    }

    #[test]
    fn test_diamond_min_max() {
        let graph = diamond();
        let target = set(4, &[3]);
        assert_eq!(graph.reach_max_one(&target).to_vec(), vec![0, 1, 3]);
        assert_eq!(graph.reach_min_one(&target).to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_diamond_positive() {
        let graph = diamond();
        let target = set(4, &[3]);
        let max = graph.reach_pre_all(&target, Scheduler::Max, Objective::Positive);
        let min = graph.reach_pre_all(&target, Scheduler::Min, Objective::Positive);
        assert_eq!(max.to_vec(), vec![0, 1, 3]);
        assert_eq!(min.to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_gamble() {
        let graph = gamble();
        let target = set(4, &[2]);
        let positive = graph.reach_pre_all(&target, Scheduler::Max, Objective::Positive);
        assert_eq!(positive.to_vec(), vec![0, 1, 2]);
        assert_eq!(graph.reach_max_one(&target).to_vec(), vec![2]);
        assert_eq!(graph.reach_min_one(&target).to_vec(), vec![2]);
    }

    #[test]
    fn test_reach_pre_delegates_max_one() {
        let graph = gamble();
        let target = set(4, &[2]);
        let via_pre = graph.reach_pre_all(&target, Scheduler::Max, Objective::AlmostSure);
        assert_eq!(via_pre, graph.reach_max_one(&target));
    }

    #[test]
    fn test_reach_pre_restricted() {
        let graph = gamble();
        let target = set(4, &[2]);
        let nodes = set(4, &[1, 2]);
        let result = graph.reach_pre(&target, &nodes, Scheduler::Max, Objective::Positive);
        assert_eq!(result.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_max_one_within() {
        let graph = diamond();
        let target = set(4, &[3]);
        let nodes = set(4, &[1, 2, 3]);
        let result = graph.reach_max_one_within(&target, &nodes);
        assert_eq!(result.to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_deadlock_never_reaches() {
        // Controlled node 0 without successors.
        let graph = MdpGraph::from_adjacency([(Role::Controlled, vec![]), (Role::Controlled, vec![1])]);
        let target = set(2, &[1]);
        for scheduler in [Scheduler::Min, Scheduler::Max] {
            for objective in [Objective::Positive, Objective::AlmostSure] {
                let result = graph.reach_pre_all(&target, scheduler, objective);
                assert_eq!(result.to_vec(), vec![1], "{} {}", scheduler, objective);
            }
        }
    }

    /// `1` may leave towards `4`; `0` and `2` only lead into `1`; `3` and `4` loop.
    fn leaky() -> MdpGraph {
        MdpGraph::from_adjacency([
            (Role::Controlled, vec![1]),
            (Role::Probabilistic, vec![0, 4]),
            (Role::Controlled, vec![1]),
            (Role::Controlled, vec![3]),
            (Role::Controlled, vec![4]),
        ])
    }

    #[test]
    fn test_remove_leaving_attr() {
        let graph = leaky();
        let mut candidate = set(5, &[0, 1, 2, 3]);
        graph.remove_leaving_attr(&mut candidate);
        assert_eq!(candidate.to_vec(), vec![3]);
    }

    #[test]
    fn test_remove_leaving_attr_keeps_closed_set() {
        let graph = leaky();
        let mut candidate = graph.all_nodes();
        graph.remove_leaving_attr(&mut candidate);
        assert_eq!(candidate, graph.all_nodes());
    }

    #[test]
    fn test_remove_leaving_attr_controlled_alternative() {
        // 0 keeps the choice 0 -> 1 -> 0 when 2 is removed.
        let graph = MdpGraph::from_adjacency([
            (Role::Controlled, vec![1, 2]),
            (Role::Probabilistic, vec![0]),
            (Role::Probabilistic, vec![3]),
            (Role::Controlled, vec![3]),
        ]);
        let mut candidate = set(4, &[0, 1, 2]);
        graph.remove_leaving_attr(&mut candidate);
        assert_eq!(candidate.to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_remove_leaving_global() {
        let graph = leaky();
        let result = graph.remove_leaving(&[4]);
        assert_eq!(result.to_vec(), vec![3]);
    }

    #[test]
    fn test_remove_leaving_global_no_seeds() {
        let graph = leaky();
        assert_eq!(graph.remove_leaving(&[]), graph.all_nodes());
    }
}
