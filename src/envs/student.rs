use super::graph_from_edges;
use crate::error::Result;
use crate::mdps::mdp::*;

/// Student MDP - D. Silver, UCL Course on RL, Lecture 2.
pub struct Student;

impl Student {
    pub fn graph() -> MdpGraph {
        graph_from_edges(
            &[
                ("class1", "facebook", "facebook", 1., -1.),
                ("class1", "study", "class2", 1., -2.),
                ("facebook", "facebook", "facebook", 1., -1.),
                ("facebook", "quit", "class1", 1., 0.),
                ("class2", "sleep", "sleep", 1., 0.),
                ("class2", "study", "class3", 1., -2.),
                ("class3", "study", "sleep", 1., 10.),
                ("class3", "pub", "class1", 0.2, 1.),
                ("class3", "pub", "class2", 0.4, 1.),
                ("class3", "pub", "class3", 0.4, 1.),
            ],
            &["sleep"],
        )
    }

    pub fn mdp() -> Result<GraphMdp> {
        GraphMdp::from_graph(Self::graph(), ["class1", "facebook"])
    }
}
