use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use arbor_protocol::{Head, TokenId, Tree};

use crate::LayoutError;

/// Governor -> dependent edges of the primary tree.
pub struct GovernorGraph {
    graph: DiGraph<TokenId, ()>,
}

impl GovernorGraph {
    /// Build the graph, rejecting governors that point outside the tree.
    pub fn from_tree(tree: &Tree) -> Result<Self, LayoutError> {
        let mut graph = DiGraph::new();
        let mut index_map: HashMap<TokenId, NodeIndex> = HashMap::new();

        for id in tree.tokens.keys().filter(|id| !matches!(id, TokenId::Group(..))) {
            index_map.insert(*id, graph.add_node(*id));
        }

        for token in tree.tokens.values() {
            let Head::Token(governor) = token.head else { continue };
            let (Some(&from), Some(&to)) = (index_map.get(&governor), index_map.get(&token.id)) else {
                return Err(LayoutError::DanglingHead { token: token.id, head: governor });
            };
            graph.add_edge(from, to, ());
        }

        Ok(Self { graph })
    }

    /// Fails on the first token found on a governor cycle.
    pub fn check_acyclic(&self) -> Result<(), LayoutError> {
        toposort(&self.graph, None)
            .map(|_| ())
            .map_err(|cycle| LayoutError::Cycle { token: self.graph[cycle.node_id()] })
    }
}

/// Upstream guard for the level assigner: every governor resolves and no cycles exist.
pub fn validate_tree(tree: &Tree) -> Result<(), LayoutError> {
    GovernorGraph::from_tree(tree)?.check_acyclic()
}
