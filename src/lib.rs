//! # mec-rs: Qualitative graph analysis for Markov decision processes
//!
//! **`mec-rs`** implements the graph-level core of an explicit-state MDP model checker:
//! qualitative reachability (attractors) and an incremental enumerator of
//! **strongly connected components** and **maximal end components (MECs)**.
//!
//! ## What is a maximal end component?
//!
//! An MDP state graph has two kinds of nodes. A *controlled* node lets a scheduler pick
//! one of its outgoing edges; a *probabilistic* node follows every outgoing edge with
//! positive probability. An **end component** is a strongly connected set of nodes that
//! some scheduler can stay inside forever: every probabilistic node keeps all of its
//! successors inside, and every controlled node keeps at least one. MECs are the maximal
//! such sets. They are the building blocks of almost-sure reachability and of
//! long-run (LTL, mean-payoff) model checking.
//!
//! ## Key Features
//!
//! - **Compact graph storage**: [`MdpGraph`][crate::graph::MdpGraph] keeps successors in
//!   compressed sparse row form and builds predecessor lists lazily, exactly once.
//! - **Qualitative reachability**: positive and almost-sure reachability under the
//!   minimizing and maximizing scheduler, see [`attractor`].
//! - **Incremental enumeration**: [`EndComponents`][crate::components::EndComponents] is an
//!   iterator that suspends its depth-first search after each component, so consumers
//!   pay only for the components they actually take.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mec_rs::bitset::BitSet;
//! use mec_rs::graph::MdpGraph;
//! use mec_rs::types::{Objective, Role, Scheduler};
//!
//! // 1. Describe the graph: node i is the i-th (role, successors) pair
//! let graph = MdpGraph::from_adjacency([
//!     (Role::Controlled, vec![1, 2]),   // 0: choose between a coin and a trap
//!     (Role::Probabilistic, vec![0, 3]), // 1: coin flip
//!     (Role::Controlled, vec![2]),      // 2: trap
//!     (Role::Controlled, vec![3]),      // 3: goal
//! ]);
//!
//! // 2. Almost-sure reachability of the goal
//! let goal = BitSet::from_indices(4, [3]);
//! let max = graph.reach_pre_all(&goal, Scheduler::Max, Objective::AlmostSure);
//! let min = graph.reach_pre_all(&goal, Scheduler::Min, Objective::AlmostSure);
//! assert_eq!(max.to_vec(), vec![0, 1, 3]);
//! assert_eq!(min.to_vec(), vec![3]); // the adversary can always pick the trap
//!
//! // 3. Maximal end components, one per call to next()
//! // The loop 0 -> 1 -> 0 is not one: the coin may fall towards the goal.
//! let mut mecs: Vec<Vec<usize>> = graph.maximal_end_components().map(|c| c.to_vec()).collect();
//! mecs.sort();
//! assert_eq!(mecs, vec![vec![2], vec![3]]);
//! ```
//!
//! ## Core Components
//!
//! - **[`graph`]**: The [`MdpGraph`][crate::graph::MdpGraph] view and its builder.
//! - **[`attractor`]**: Backward fixpoints for qualitative reachability and leaving-state removal.
//! - **[`components`]**: The resumable SCC/MEC enumerator.
//! - **[`bitset`]**: Fixed-universe node sets used throughout.
//! - **[`dot`]**: Utilities for visualizing graphs and components using Graphviz.

pub mod attractor;
pub mod bitset;
pub mod components;
pub mod dot;
pub mod graph;
pub mod types;
