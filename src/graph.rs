//! Explicit MDP state graph.
//!
//! [`MdpGraph`] stores successors in compressed sparse row form: the
//! successors of node `n` are `targets[bounds[n]..bounds[n + 1]]`. Every node
//! carries a [`Role`]. Predecessor lists are derived on demand by
//! [`MdpGraph::compute_predecessors`] and cached for the lifetime of the graph.
//!
//! # Examples
//!
//! ```
//! use mec_rs::graph::GraphBuilder;
//! use mec_rs::types::Role;
//!
//! let mut builder = GraphBuilder::new();
//! let s = builder.add_node(Role::Controlled, [1]);
//! let d = builder.add_node(Role::Probabilistic, [0]);
//! let graph = builder.build();
//!
//! assert_eq!(graph.num_nodes(), 2);
//! assert_eq!(graph.successors(s), &[d]);
//!
//! graph.compute_predecessors();
//! assert_eq!(graph.predecessors(s), &[d]);
//! ```

use std::cell::OnceCell;
use std::fmt;

use log::debug;

use crate::bitset::BitSet;
use crate::types::Role;

/// Incrementally assembles an [`MdpGraph`], one node at a time.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    roles: Vec<Role>,
    bounds: Vec<usize>,
    targets: Vec<usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Creates a builder with room for `nodes` nodes and `edges` edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut bounds = Vec::with_capacity(nodes + 1);
        bounds.push(0);
        Self {
            roles: Vec::with_capacity(nodes),
            bounds,
            targets: Vec::with_capacity(edges),
        }
    }

    /// Number of nodes added so far.
    pub fn num_nodes(&self) -> usize {
        self.roles.len()
    }

    /// Appends a node and returns its index.
    ///
    /// Successors may refer to nodes that have not been added yet; they are
    /// validated by [`build`](Self::build).
    pub fn add_node(&mut self, role: Role, successors: impl IntoIterator<Item = usize>) -> usize {
        let node = self.roles.len();
        self.roles.push(role);
        self.targets.extend(successors);
        self.bounds.push(self.targets.len());
        node
    }

    /// Finishes the graph.
    ///
    /// # Panics
    ///
    /// Panics if any successor index is not a node of the graph.
    pub fn build(self) -> MdpGraph {
        let num_nodes = self.roles.len();
        for node in 0..num_nodes {
            for &succ in &self.targets[self.bounds[node]..self.bounds[node + 1]] {
                assert!(
                    succ < num_nodes,
                    "Successor {} of node {} out of range 0..{}",
                    succ,
                    node,
                    num_nodes
                );
            }
        }
        debug!("build: {} nodes, {} edges", num_nodes, self.targets.len());
        MdpGraph {
            roles: self.roles,
            bounds: self.bounds,
            targets: self.targets,
            predecessors: OnceCell::new(),
        }
    }
}

/// Predecessor lists in compressed sparse row form.
#[derive(Debug, Clone)]
struct Predecessors {
    bounds: Vec<usize>,
    sources: Vec<usize>,
}

/// A read-only MDP state graph over nodes `0..num_nodes()`.
#[derive(Clone)]
pub struct MdpGraph {
    roles: Vec<Role>,
    bounds: Vec<usize>,
    targets: Vec<usize>,
    predecessors: OnceCell<Predecessors>,
}

impl MdpGraph {
    /// Builds a graph from `(role, successors)` pairs, node `i` being the `i`-th pair.
    pub fn from_adjacency<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (Role, S)>,
        S: IntoIterator<Item = usize>,
    {
        let mut builder = GraphBuilder::new();
        for (role, successors) in nodes {
            builder.add_node(role, successors);
        }
        builder.build()
    }

    pub fn num_nodes(&self) -> usize {
        self.roles.len()
    }

    pub fn num_edges(&self) -> usize {
        self.targets.len()
    }

    /// Returns the set of all nodes.
    pub fn all_nodes(&self) -> BitSet {
        BitSet::full(self.num_nodes())
    }

    fn check_node(&self, node: usize) {
        assert!(
            node < self.num_nodes(),
            "Node index {} out of range 0..{}",
            node,
            self.num_nodes()
        );
    }

    pub fn role(&self, node: usize) -> Role {
        self.check_node(node);
        self.roles[node]
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        self.check_node(node);
        &self.targets[self.bounds[node]..self.bounds[node + 1]]
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.successors(node).len()
    }

    pub fn has_self_loop(&self, node: usize) -> bool {
        self.successors(node).contains(&node)
    }

    /// Builds the predecessor lists, unless they are already built.
    ///
    /// Each edge `u -> v` contributes one entry `u` to the predecessors of `v`,
    /// so parallel edges appear once per occurrence.
    pub fn compute_predecessors(&self) {
        self.predecessors.get_or_init(|| {
            let num_nodes = self.num_nodes();
            let mut bounds = vec![0; num_nodes + 1];
            for &succ in &self.targets {
                bounds[succ + 1] += 1;
            }
            for node in 0..num_nodes {
                bounds[node + 1] += bounds[node];
            }
            let mut fill = bounds.clone();
            let mut sources = vec![0; self.targets.len()];
            for node in 0..num_nodes {
                for &succ in self.successors(node) {
                    sources[fill[succ]] = node;
                    fill[succ] += 1;
                }
            }
            debug!("compute_predecessors: {} entries", sources.len());
            Predecessors { bounds, sources }
        });
    }

    /// Returns true if predecessor lists are available.
    pub fn has_predecessors(&self) -> bool {
        self.predecessors.get().is_some()
    }

    /// Drops the cached predecessor lists.
    pub fn clear_predecessors(&mut self) {
        self.predecessors.take();
    }

    /// Returns the predecessors of `node`.
    ///
    /// # Panics
    ///
    /// Panics if [`compute_predecessors`](Self::compute_predecessors) has not been called.
    pub fn predecessors(&self, node: usize) -> &[usize] {
        self.check_node(node);
        match self.predecessors.get() {
            Some(preds) => &preds.sources[preds.bounds[node]..preds.bounds[node + 1]],
            None => panic!("Predecessors requested before compute_predecessors()"),
        }
    }
}

impl fmt::Debug for MdpGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MdpGraph")
            .field("nodes", &self.num_nodes())
            .field("edges", &self.num_edges())
            .field("predecessors", &self.has_predecessors())
            .finish()
    }
}
