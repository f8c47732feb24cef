//! Value types shared by the graph and the qualitative algorithms.
//!
//! The analyses are parameterized by who resolves nondeterminism
//! ([`Scheduler`]) and by how strong the reachability requirement is
//! ([`Objective`]). Nodes of the state graph carry a [`Role`].

use std::fmt;

/// Role of a node in an MDP state graph.
///
/// MDP graphs are usually bipartite: a controlled node (state) picks one of
/// its outgoing edges (actions), each leading to a probabilistic node whose
/// outgoing edges form the support of a distribution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Role {
    /// Nondeterministic choice between the outgoing edges.
    Controlled,
    /// Random choice: every outgoing edge is taken with positive probability.
    Probabilistic,
}

impl Role {
    pub fn is_controlled(self) -> bool {
        self == Role::Controlled
    }

    pub fn is_probabilistic(self) -> bool {
        self == Role::Probabilistic
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Controlled => write!(f, "controlled"),
            Role::Probabilistic => write!(f, "probabilistic"),
        }
    }
}

/// Direction in which controlled choices are resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Scheduler {
    /// Adversarial: every choice must satisfy the objective.
    Min,
    /// Cooperative: one good choice suffices.
    Max,
}

impl Scheduler {
    /// Returns the opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Scheduler::Min => Scheduler::Max,
            Scheduler::Max => Scheduler::Min,
        }
    }

    pub fn is_min(self) -> bool {
        self == Scheduler::Min
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::Min => write!(f, "min"),
            Scheduler::Max => write!(f, "max"),
        }
    }
}

/// Strength of a reachability objective.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Objective {
    /// Reach the target with positive probability.
    Positive,
    /// Reach the target with probability exactly one.
    AlmostSure,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Positive => write!(f, "P>0"),
            Objective::AlmostSure => write!(f, "P=1"),
        }
    }
}

/// What the component enumerator reports.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentMode {
    /// Plain strongly connected components.
    Scc,
    /// Maximal end components.
    Mec,
}

impl fmt::Display for ComponentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentMode::Scc => write!(f, "SCC"),
            ComponentMode::Mec => write!(f, "MEC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_flip() {
        assert_eq!(Scheduler::Min.flip(), Scheduler::Max);
        assert_eq!(Scheduler::Max.flip(), Scheduler::Min);
        assert_eq!(Scheduler::Min.flip().flip(), Scheduler::Min);
        assert!(Scheduler::Min.is_min());
        assert!(!Scheduler::Max.is_min());
    }

    #[test]
    fn test_role_predicates() {
        assert!(Role::Controlled.is_controlled());
        assert!(!Role::Controlled.is_probabilistic());
        assert!(Role::Probabilistic.is_probabilistic());
    }

    #[test]
    fn test_display() {
        assert_eq!(Role::Controlled.to_string(), "controlled");
        assert_eq!(Scheduler::Max.to_string(), "max");
        assert_eq!(Objective::AlmostSure.to_string(), "P=1");
        assert_eq!(ComponentMode::Mec.to_string(), "MEC");
    }
}
