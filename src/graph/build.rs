use tracing::debug;

use crate::capture::Capture;

use super::{HopGraph, Parent};

/// Merges the hop chains of every capture into one graph. Later captures
/// overwrite the parent of a shared hop; branches accumulate.
pub fn build_graph(captures: &[Capture]) -> HopGraph {
    let mut graph = HopGraph::default();

    for capture in captures {
        let chain = capture.hop_chain();
        if chain.is_empty() {
            debug!(capture = %capture.id, "capture has no usable hops");
            continue;
        }

        graph.ensure_node(chain[0]).parent = Parent::Root;

        for pair in chain.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            graph.ensure_node(previous).branches.insert(current.to_owned());
            graph.ensure_node(current).parent = Parent::Hop(previous.to_owned());
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built hop graph"
    );
    graph
}
