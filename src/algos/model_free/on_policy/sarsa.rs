use crate::agents::{Agent, SoftAgent};
use crate::config::ControlConfig;
use crate::error::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SarsaOutcome {
    /// Episodes that started from a non-terminal state.
    pub episodes: usize,
    /// Number of TD updates applied.
    pub updates: usize,
}

/// Q(s,a) ← Q(s,a) + α[r + γ·Q(s',a') - Q(s,a)]
pub fn td_update(
    agent: &mut SoftAgent,
    (s, a): (&str, &str),
    reward: f64,
    (next_s, next_a): (&str, &str),
) -> Result<f64> {
    let q = agent.action_value(s, a)?;
    let next_q = agent.action_value(next_s, next_a)?;
    let target = reward + agent.gamma() * next_q;
    let updated = q + agent.learning_rate() * (target - q);
    agent.update_action_value(s, a, updated)?;

    Ok(updated)
}

/// SARSA: on-policy TD control - Sutton & Barto 2018, 6.4.
///
/// Reaching a terminal state ends the episode without a further update.
pub fn sarsa(agent: &mut SoftAgent, control: &ControlConfig) -> Result<SarsaOutcome> {
    agent.randomise_action_values()?;
    agent.initialise_policy_according_to_action_values()?;

    let mut outcome = SarsaOutcome::default();
    for e in 0..control.episodes {
        let (mut s, first_action) = agent.sample_initial_state_and_initial_action()?;
        let Some(mut a) = first_action else {
            debug!(episode = e + 1, state = %s, "episode starts in a terminal state");
            continue;
        };
        outcome.episodes += 1;

        let mut steps = 0;
        loop {
            if steps == control.max_td_steps {
                warn!(episode = e + 1, max_td_steps = control.max_td_steps, "episode truncated");
                break;
            }
            steps += 1;

            let (next_s, reward, next_action) = agent.sample_next_state_and_next_action(&s, &a)?;
            let Some(next_a) = next_action else {
                break;
            };

            td_update(
                agent,
                (s.as_str(), a.as_str()),
                reward,
                (next_s.as_str(), next_a.as_str()),
            )?;
            outcome.updates += 1;
            if let Some(best) = agent.greedy_action(&s)? {
                agent.update_policy(&s, &best)?;
            }

            s = next_s;
            a = next_a;
        }
        debug!(episode = e + 1, steps, "sarsa episode finished");
    }

    info!(
        episodes = outcome.episodes,
        updates = outcome.updates,
        "sarsa finished"
    );
    Ok(outcome)
}
