//! Contact Graph Builder
//!
//! Directed Erdős–Rényi graph, symmetrized into a bidirectional contact network.

use rand::Rng;

use strain_events::NodeId;

use crate::components::network::{ContactGraph, EdgeWeightPolicy};

/// Parameters for building the contact graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSpec {
    pub num_nodes: usize,
    pub avg_node_degree: f64,
    pub weight: EdgeWeightPolicy,
    pub include_self: bool,
}

/// Edge probability `d / N`, clamped to `[0, 1]`. Zero for an empty graph.
pub fn edge_probability(num_nodes: usize, avg_node_degree: f64) -> f64 {
    if num_nodes == 0 {
        return 0.0;
    }
    (avg_node_degree / num_nodes as f64).clamp(0.0, 1.0)
}

/// Build the contact graph.
///
/// One Bernoulli trial per ordered pair `(u, v)`, `u != v`, source-major. Every edge
/// whose reverse is missing then gets a reverse edge with its own weight draw.
pub fn build_contact_graph<R: Rng>(rng: &mut R, spec: &GraphSpec) -> ContactGraph {
    let n = spec.num_nodes;
    let p = edge_probability(n, spec.avg_node_degree);
    let mut graph = ContactGraph::with_nodes(n)
        .with_self_inclusion(spec.include_self, spec.weight.self_weight());

    for u in 0..n {
        for v in 0..n {
            if u == v {
                continue;
            }
            if rng.gen_bool(p) {
                let weight = spec.weight.draw(rng);
                graph.insert_edge(NodeId(u), NodeId(v), weight);
            }
        }
    }

    let directed: Vec<(NodeId, NodeId)> = graph.edges().map(|(u, v, _)| (u, v)).collect();
    for (u, v) in directed {
        if !graph.contains_edge(v, u) {
            let weight = spec.weight.draw(rng);
            graph.insert_edge(v, u, weight);
        }
    }

    tracing::debug!(
        nodes = n,
        edge_probability = p,
        edges = graph.edge_count(),
        "built contact graph"
    );

    graph
}
