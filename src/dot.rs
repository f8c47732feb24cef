//! MDP graph to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Controlled nodes** are circles, **probabilistic nodes** are diamonds
//! - **Edges** leaving controlled nodes are solid, edges leaving probabilistic
//!   nodes are dashed
//! - Each **component** passed in is drawn as a filled cluster
//!
//! # Examples
//!
//! ```
//! use mec_rs::graph::MdpGraph;
//! use mec_rs::types::Role;
//!
//! let graph = MdpGraph::from_adjacency([
//!     (Role::Controlled, vec![1]),
//!     (Role::Probabilistic, vec![0]),
//! ]);
//! let mecs: Vec<_> = graph.maximal_end_components().collect();
//!
//! let dot = graph.to_dot(&mecs).unwrap();
//! assert!(dot.contains("subgraph cluster_0"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use crate::bitset::BitSet;
use crate::graph::MdpGraph;
use crate::types::Role;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for controlled nodes (default: "circle")
    pub controlled_shape: &'static str,
    /// Shape for probabilistic nodes (default: "diamond")
    pub probabilistic_shape: &'static str,
    /// Style for edges out of controlled nodes (default: "solid")
    pub controlled_edge_style: &'static str,
    /// Style for edges out of probabilistic nodes (default: "dashed")
    pub probabilistic_edge_style: &'static str,
    /// Fill color of component clusters (default: "lightgrey")
    pub component_color: &'static str,
    /// Graph direction (default: "LR")
    pub rankdir: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            controlled_shape: "circle",
            probabilistic_shape: "diamond",
            controlled_edge_style: "solid",
            probabilistic_edge_style: "dashed",
            component_color: "lightgrey",
            rankdir: "LR",
        }
    }
}

impl MdpGraph {
    /// Converts the graph to DOT format, highlighting the given components.
    ///
    /// A node listed in several components is drawn in the first one only.
    pub fn to_dot(&self, components: &[BitSet]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(components, &DotConfig::default())
    }

    /// Converts the graph to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, components: &[BitSet], config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let shape = |node: usize| match self.role(node) {
            Role::Controlled => config.controlled_shape,
            Role::Probabilistic => config.probabilistic_shape,
        };

        let mut owner = vec![None; self.num_nodes()];
        for (i, component) in components.iter().enumerate() {
            for node in component {
                owner[node].get_or_insert(i);
            }
        }

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir={};", config.rankdir)?;

        for (i, component) in components.iter().enumerate() {
            writeln!(dot, "subgraph cluster_{} {{", i)?;
            writeln!(dot, "style=filled; color={}; label=\"C{}\";", config.component_color, i)?;
            for node in component.iter().filter(|&node| owner[node] == Some(i)) {
                writeln!(dot, "{} [shape={}];", node, shape(node))?;
            }
            writeln!(dot, "}}")?;
        }

        for node in (0..self.num_nodes()).filter(|&node| owner[node].is_none()) {
            writeln!(dot, "{} [shape={}];", node, shape(node))?;
        }

        for node in 0..self.num_nodes() {
            let style = match self.role(node) {
                Role::Controlled => config.controlled_edge_style,
                Role::Probabilistic => config.probabilistic_edge_style,
            };
            for &succ in self.successors(node) {
                writeln!(dot, "{} -> {} [style={}];", node, succ, style)?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MdpGraph {
        MdpGraph::from_adjacency([
            (Role::Controlled, vec![1, 2]),
            (Role::Probabilistic, vec![0]),
            (Role::Controlled, vec![]),
        ])
    }

    #[test]
    fn test_to_dot_basic() {
        let graph = sample();
        let dot = graph.to_dot(&[]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("0 [shape=circle];"));
        assert!(dot.contains("1 [shape=diamond];"));
        assert!(dot.contains("0 -> 2 [style=solid];"));
        assert!(dot.contains("1 -> 0 [style=dashed];"));
    }

    #[test]
    fn test_to_dot_components() {
        let graph = sample();
        let mecs: Vec<_> = graph.maximal_end_components().collect();
        let dot = graph.to_dot(&mecs).unwrap();
        assert_eq!(dot.matches("subgraph cluster_").count(), mecs.len());
        // Every node is declared exactly once.
        for node in 0..3 {
            assert_eq!(dot.matches(&format!("\n{} [shape=", node)).count(), 1);
        }
    }

    #[test]
    fn test_to_dot_overlapping_components() {
        let graph = sample();
        let a = BitSet::from_indices(3, [0, 1]);
        let b = BitSet::from_indices(3, [1, 2]);
        let dot = graph.to_dot(&[a, b]).unwrap();
        assert_eq!(dot.matches("\n1 [shape=").count(), 1);
    }

    #[test]
    fn test_to_dot_with_config() {
        let graph = sample();
        let config = DotConfig {
            probabilistic_shape: "point",
            rankdir: "TB",
            ..DotConfig::default()
        };
        let dot = graph.to_dot_with_config(&[], &config).unwrap();
        assert!(dot.contains("rankdir=TB;"));
        assert!(dot.contains("1 [shape=point];"));
    }
}
