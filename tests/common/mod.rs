//! Random graph generation and naive reference algorithms shared by the integration tests.

#![allow(dead_code)]

use mec_rs::bitset::BitSet;
use mec_rs::graph::MdpGraph;
use mec_rs::types::Role;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Builds a random MDP graph with `n` nodes and at most `max_degree` successors per node.
pub fn random_mdp(n: usize, max_degree: usize, seed: u64) -> MdpGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    MdpGraph::from_adjacency((0..n).map(|_| {
        let role = if rng.random_bool(0.5) {
            Role::Controlled
        } else {
            Role::Probabilistic
        };
        let degree = rng.random_range(0..=max_degree);
        let successors: Vec<usize> = (0..degree).map(|_| rng.random_range(0..n)).collect();
        (role, successors)
    }))
}

/// Random subset of `0..n`, each node kept with probability `p`.
pub fn random_subset(n: usize, p: f64, seed: u64) -> BitSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    BitSet::from_indices(n, (0..n).filter(|_| rng.random_bool(p)))
}

/// Nodes of `set` reachable from `from` inside `set`.
pub fn reachable_within(graph: &MdpGraph, set: &BitSet, from: usize) -> BitSet {
    let mut seen = BitSet::new(graph.num_nodes());
    let mut stack = vec![from];
    seen.insert(from);
    while let Some(node) = stack.pop() {
        for &succ in graph.successors(node) {
            if set.contains(succ) && seen.insert(succ) {
                stack.push(succ);
            }
        }
    }
    seen
}

/// Strongly connected components of the subgraph induced by `set`, by pairwise reachability.
pub fn naive_sccs(graph: &MdpGraph, set: &BitSet) -> Vec<Vec<usize>> {
    let n = graph.num_nodes();
    let forward: Vec<Option<BitSet>> = (0..n)
        .map(|node| set.contains(node).then(|| reachable_within(graph, set, node)))
        .collect();
    let mut assigned = BitSet::new(n);
    let mut result = Vec::new();
    for v in set {
        if assigned.contains(v) {
            continue;
        }
        let reach_v = forward[v].as_ref().unwrap();
        let scc: Vec<usize> = set
            .iter()
            .filter(|&u| reach_v.contains(u) && forward[u].as_ref().unwrap().contains(v))
            .collect();
        for &u in &scc {
            assigned.insert(u);
        }
        result.push(scc);
    }
    result
}

/// Whether a single-node SCC `{node}` is an end component.
pub fn singleton_closed(graph: &MdpGraph, node: usize) -> bool {
    let successors = graph.successors(node);
    successors.is_empty()
        || match graph.role(node) {
            Role::Controlled => successors.contains(&node),
            Role::Probabilistic => successors.iter().all(|&succ| succ == node),
        }
}

/// Whether `component` (a strongly connected set) is closed.
pub fn is_closed(graph: &MdpGraph, component: &[usize]) -> bool {
    if let [node] = component {
        return singleton_closed(graph, *node);
    }
    let set = BitSet::from_indices(graph.num_nodes(), component.iter().copied());
    component.iter().all(|&node| {
        let successors = graph.successors(node);
        match graph.role(node) {
            Role::Probabilistic => successors.iter().all(|&succ| set.contains(succ)),
            Role::Controlled => successors.iter().any(|&succ| set.contains(succ)),
        }
    })
}

/// Maximal end components of `set`: drop nodes of non-closed SCCs until nothing changes.
pub fn naive_mecs(graph: &MdpGraph, set: &BitSet) -> Vec<Vec<usize>> {
    let mut current = set.clone();
    loop {
        let sccs = naive_sccs(graph, &current);
        let mut changed = false;
        for scc in &sccs {
            let scc_set = BitSet::from_indices(graph.num_nodes(), scc.iter().copied());
            for &node in scc {
                let successors = graph.successors(node);
                let leaves = if scc.len() == 1 {
                    !singleton_closed(graph, node)
                } else {
                    match graph.role(node) {
                        Role::Probabilistic => successors.iter().any(|&succ| !scc_set.contains(succ)),
                        Role::Controlled => !successors.iter().any(|&succ| scc_set.contains(succ)),
                    }
                };
                if leaves {
                    current.remove(node);
                    changed = true;
                }
            }
        }
        if !changed {
            return sorted(sccs);
        }
    }
}

pub fn sorted(mut components: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    for component in &mut components {
        component.sort_unstable();
    }
    components.sort();
    components
}
