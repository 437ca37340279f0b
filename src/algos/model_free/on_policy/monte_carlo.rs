use crate::agents::{Agent, Episode, SoftAgent};
use crate::config::ControlConfig;
use crate::error::Result;
use crate::mdps::mdp::{Action, State};
use std::collections::HashMap;
use tracing::{debug, info};

/// Observed returns per `(state, action)`, in the order they were observed.
#[derive(Debug, Clone, Default)]
pub struct ReturnsHistory {
    returns: HashMap<(State, Action), Vec<f64>>,
}

impl ReturnsHistory {
    /// Appends `g` and returns the new mean.
    pub fn record(&mut self, s: &str, a: &str, g: f64) -> f64 {
        let returns = self
            .returns
            .entry((s.to_string(), a.to_string()))
            .or_default();
        returns.push(g);
        returns.iter().sum::<f64>() / returns.len() as f64
    }

    pub fn returns(&self, s: &str, a: &str) -> &[f64] {
        self.returns
            .get(&(s.to_string(), a.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    pub fn mean(&self, s: &str, a: &str) -> Option<f64> {
        let returns = self.returns(s, a);
        if returns.is_empty() {
            None
        } else {
            Some(returns.iter().sum::<f64>() / returns.len() as f64)
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = &(State, Action)> {
        self.returns.keys()
    }
}

/// Every-visit update: walks the episode backwards accumulating
/// `G = r + γ·G` and moves Q(s, a) to the mean of all returns seen for it.
pub fn update_from_episode(
    agent: &mut SoftAgent,
    episode: &Episode,
    history: &mut ReturnsHistory,
) -> Result<()> {
    let gamma = agent.gamma();
    let mut g = 0.;
    for step in episode.steps.iter().rev() {
        g = step.reward + gamma * g;
        let mean = history.record(&step.state, &step.action, g);
        agent.update_action_value(&step.state, &step.action, mean)?;
    }

    Ok(())
}

/// Moves the policy of every non-terminal state towards argmax_a Q(s, a).
pub fn improve_policy(agent: &mut SoftAgent) -> Result<()> {
    for s in agent.perceived_states() {
        if agent.is_terminal(&s)? {
            continue;
        }
        if let Some(best) = agent.greedy_action(&s)? {
            agent.update_policy(&s, &best)?;
        }
    }

    Ok(())
}

/// On-policy Monte Carlo control for epsilon-soft policies - Sutton & Barto 2018, 5.4.
pub fn on_policy_monte_carlo_control(
    agent: &mut SoftAgent,
    control: &ControlConfig,
) -> Result<ReturnsHistory> {
    agent.randomise_action_values()?;
    agent.random_initialise_epsilon_soft_policy()?;

    let mut history = ReturnsHistory::default();
    for e in 0..control.episodes {
        let episode = agent.generate_sample_episode(control.max_episode_steps)?;
        debug!(
            episode = e + 1,
            steps = episode.steps.len(),
            final_state = %episode.final_state,
            "sampled episode"
        );

        update_from_episode(agent, &episode, &mut history)?;
        improve_policy(agent)?;
    }

    info!(episodes = control.episodes, "monte carlo control finished");
    Ok(history)
}
