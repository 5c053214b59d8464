use indexmap::{IndexMap, IndexSet};

mod build;

pub use build::build_graph;

/// Where a node was last reached from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Parent {
    /// Referenced only as a child so far.
    #[default]
    Unknown,
    /// First hop of some capture.
    Root,
    Hop(String),
}

impl Parent {
    pub fn label(&self) -> &str {
        match self {
            Self::Unknown => "",
            Self::Root => "root",
            Self::Hop(address) => address,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphNode {
    pub parent: Parent,
    /// Successors seen in any capture, in first-seen order.
    pub branches: IndexSet<String>,
}

impl GraphNode {
    pub fn is_leaf(&self) -> bool {
        self.branches.is_empty()
    }
}

/// Merged hop-graph of every capture, keyed by hop address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HopGraph {
    pub nodes: IndexMap<String, GraphNode>,
}

impl HopGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.branches.len()).sum()
    }

    pub fn get(&self, address: &str) -> Option<&GraphNode> {
        self.nodes.get(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains_key(address)
    }

    /// Nodes that currently start a capture, in first-seen order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent == Parent::Root)
            .map(|(address, _)| address.as_str())
            .collect()
    }

    /// Follows parent pointers up to a root. `None` when the chain is broken or
    /// loops back on itself.
    pub fn path_from_root(&self, target: &str) -> Option<Vec<String>> {
        let mut path = vec![target.to_owned()];
        let mut cursor = self.nodes.get(target)?;

        for _ in 0..self.node_count() {
            match &cursor.parent {
                Parent::Root => {
                    path.reverse();
                    return Some(path);
                }
                Parent::Unknown => return None,
                Parent::Hop(address) => {
                    path.push(address.clone());
                    cursor = self.nodes.get(address)?;
                }
            }
        }

        None
    }

    pub(crate) fn ensure_node(&mut self, address: &str) -> &mut GraphNode {
        self.nodes.entry(address.to_owned()).or_default()
    }
}
