use super::graph_from_edges;
use crate::error::Result;
use crate::mdps::mdp::*;

/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
pub struct SimpleGolf;

impl SimpleGolf {
    pub fn graph() -> MdpGraph {
        graph_from_edges(
            &[
                ("fairway", "drive", "green", 0.9, 0.),
                ("fairway", "drive", "fairway", 0.1, 0.),
                ("green", "chip", "fairway", 0.9, 0.),
                ("green", "chip", "green", 0.1, 0.),
                ("green", "putt", "hole", 0.9, 10.),
                ("green", "putt", "green", 0.1, 0.),
            ],
            &["hole"],
        )
    }

    pub fn mdp() -> Result<GraphMdp> {
        GraphMdp::from_graph(Self::graph(), ["fairway"])
    }
}
