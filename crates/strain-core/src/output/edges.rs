//! Edge List Export

use std::fs;
use std::path::Path;

use crate::components::network::ContactGraph;

/// Edge list as `|u,v|u,v|...|`, every directed edge once, ordered by source then target.
///
/// A graph without edges renders as `|`.
pub fn edge_list_string(graph: &ContactGraph) -> String {
    let mut out = String::from("|");
    for (from, to, _) in graph.edges() {
        out.push_str(&format!("{},{}|", from, to));
    }
    out
}

pub fn write_edge_list(path: impl AsRef<Path>, graph: &ContactGraph) -> std::io::Result<()> {
    fs::write(path, edge_list_string(graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strain_events::NodeId;

    #[test]
    fn test_edge_list_format() {
        let mut graph = ContactGraph::with_nodes(4);
        for (a, b) in [(3, 0), (0, 1), (0, 3), (1, 0)] {
            graph.insert_edge(NodeId(a), NodeId(b), 0.5);
        }
        assert_eq!(edge_list_string(&graph), "|0,1|0,3|1,0|3,0|");
    }

    #[test]
    fn test_empty_edge_list() {
        assert_eq!(edge_list_string(&ContactGraph::with_nodes(3)), "|");
    }
}
