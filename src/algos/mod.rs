pub mod model_based;
pub mod model_free;

pub use model_based::policy_iteration::{policy_iteration, PolicyIterationOutcome};
pub use model_free::on_policy::monte_carlo::{on_policy_monte_carlo_control, ReturnsHistory};
pub use model_free::on_policy::sarsa::{sarsa, SarsaOutcome};

use crate::activity::Activity;
use crate::agents::{DpAgent, SoftAgent};
use crate::config::Config;
use crate::error::Result;
use crate::mdps::mdp::Mdp;
use std::rc::Rc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Algorithm {
    PolicyIteration,
    MonteCarlo,
    Sarsa,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Self::PolicyIteration, Self::MonteCarlo, Self::Sarsa];

    /// Runs one control algorithm on a fresh agent and returns its finished log.
    pub fn run(self, mdp: Rc<dyn Mdp>, config: &Config) -> Result<Vec<Activity>> {
        info!(algorithm = ?self, states = mdp.states().len(), "running");
        match self {
            Self::PolicyIteration => {
                let mut agent = DpAgent::perceive(mdp, config.agent.clone());
                policy_iteration(&mut agent, &config.control)?;
                Ok(agent.into_activity_log())
            }
            Self::MonteCarlo => {
                let mut agent = SoftAgent::perceive(mdp, config.agent.clone());
                on_policy_monte_carlo_control(&mut agent, &config.control)?;
                Ok(agent.into_activity_log())
            }
            Self::Sarsa => {
                let mut agent = SoftAgent::perceive(mdp, config.agent.clone());
                sarsa(&mut agent, &config.control)?;
                Ok(agent.into_activity_log())
            }
        }
    }
}
