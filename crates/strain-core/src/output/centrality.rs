//! Centrality
//!
//! Degree and betweenness centrality of the contact graph, treating edges as
//! directed and unweighted.

use std::collections::VecDeque;

use strain_events::{CentralityReport, NodeCentrality, NodeId};

use crate::components::network::ContactGraph;

/// Out-degree over `n - 1`; 1.0 for graphs with fewer than two nodes.
pub fn degree_centrality(graph: &ContactGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n)
        .map(|i| graph.out_degree(NodeId(i)) as f64 * scale)
        .collect()
}

/// Brandes betweenness, normalized by `1 / ((n - 1)(n - 2))`.
pub fn betweenness_centrality(graph: &ContactGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut betweenness = vec![0.0; n];
    if n <= 2 {
        return betweenness;
    }

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut distance = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::new();

    for source in 0..n {
        stack.clear();
        for list in predecessors.iter_mut() {
            list.clear();
        }
        sigma.iter_mut().for_each(|s| *s = 0.0);
        distance.iter_mut().for_each(|d| *d = -1);
        sigma[source] = 1.0;
        distance[source] = 0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for edge in graph.out_edges(NodeId(v)) {
                let w = edge.target.index();
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        delta.iter_mut().for_each(|d| *d = 0.0);
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                betweenness[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    betweenness.iter_mut().for_each(|b| *b *= scale);
    betweenness
}

pub fn centrality_report(graph: &ContactGraph) -> CentralityReport {
    let degree = degree_centrality(graph);
    let betweenness = betweenness_centrality(graph);
    CentralityReport {
        nodes: degree
            .into_iter()
            .zip(betweenness)
            .enumerate()
            .map(|(i, (degree, betweenness))| NodeCentrality {
                node: NodeId(i),
                degree,
                betweenness,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected(n: usize, edges: &[(usize, usize)]) -> ContactGraph {
        let mut graph = ContactGraph::with_nodes(n);
        for &(a, b) in edges {
            graph.insert_edge(NodeId(a), NodeId(b), 0.5);
            graph.insert_edge(NodeId(b), NodeId(a), 0.5);
        }
        graph
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_path_graph() {
        let graph = undirected(3, &[(0, 1), (1, 2)]);
        let report = centrality_report(&graph);

        assert!(close(report.nodes[1].betweenness, 1.0));
        assert!(close(report.nodes[0].betweenness, 0.0));
        assert!(close(report.nodes[1].degree, 1.0));
        assert!(close(report.nodes[0].degree, 0.5));
    }

    #[test]
    fn test_star_graph() {
        let graph = undirected(4, &[(0, 1), (0, 2), (0, 3)]);
        let report = centrality_report(&graph);

        assert!(close(report.nodes[0].betweenness, 1.0));
        for leaf in 1..4 {
            assert!(close(report.nodes[leaf].betweenness, 0.0));
        }
        assert_eq!(report.top_by_betweenness(1)[0].node, NodeId(0));
    }

    #[test]
    fn test_cycle_shares_betweenness() {
        // Each node lies on one of the two shortest paths between its neighbors
        let graph = undirected(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let betweenness = betweenness_centrality(&graph);
        assert!(betweenness.iter().all(|b| close(*b, betweenness[0])));
        assert!(close(betweenness[0], 1.0 / 6.0));
    }

    #[test]
    fn test_tiny_graphs() {
        assert_eq!(degree_centrality(&ContactGraph::with_nodes(1)), vec![1.0]);
        assert_eq!(betweenness_centrality(&undirected(2, &[(0, 1)])), vec![0.0, 0.0]);
        assert!(centrality_report(&ContactGraph::with_nodes(0)).nodes.is_empty());
    }
}
