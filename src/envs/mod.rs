pub mod simple_golf;
pub mod student;

use crate::mdps::mdp::*;

/// Builds a graph from `(state, action, next_state, probability, reward)`
/// edges. States and actions keep their order of first appearance; `sinks`
/// adds states without outgoing actions.
pub fn graph_from_edges(edges: &[(&str, &str, &str, f64, f64)], sinks: &[&str]) -> MdpGraph {
    let mut graph = MdpGraph::new();
    for &(s, a, next, probability, reward) in edges {
        graph
            .entry(s.to_string())
            .or_default()
            .entry(a.to_string())
            .or_default()
            .insert(
                next.to_string(),
                Transition {
                    probability,
                    reward,
                },
            );
    }
    for &s in sinks {
        graph.entry(s.to_string()).or_default();
    }

    graph
}
