use crate::agents::{Agent, DpAgent};
use crate::config::ControlConfig;
use crate::error::Result;
use crate::mdps::mdp::{Action, State};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyIterationOutcome {
    pub policy_stable: bool,
    pub iterations: usize,
}

/// Σ p(s' | s, a) · (r + γ·V(s'))
pub fn expected_value(agent: &DpAgent, s: &str, a: &str) -> Result<f64> {
    let knowledge = agent.knowledge();
    let gamma = knowledge.gamma();

    knowledge
        .perceived_next_states(s, a)?
        .into_iter()
        .try_fold(0., |acc, next| {
            let (p, r, v) = knowledge.transition_info(s, a, next)?;
            Ok(acc + p * (r + gamma * v))
        })
}

/// Action with the highest expected value; later actions win ties.
pub fn argmax_action(agent: &DpAgent, s: &str) -> Result<Option<Action>> {
    let mut best_action = None;
    let mut best_value = f64::NEG_INFINITY;
    for a in agent.perceived_actions(s)? {
        let v = expected_value(agent, s, &a)?;
        if v >= best_value {
            best_action = Some(a);
            best_value = v;
        }
    }

    Ok(best_action)
}

/// Sweeps V under the current policy until the largest change of a sweep is
/// below `theta`. Returns the number of sweeps.
fn evaluate_policy(agent: &mut DpAgent, states: &[State], control: &ControlConfig) -> Result<usize> {
    for sweep in 1..=control.max_sweeps {
        let mut max_error: f64 = 0.;
        for s in states {
            if agent.is_terminal(s)? {
                continue;
            }

            let current = agent.state_value(s)?;
            let a = agent.policy_action(s)?.clone();
            let v = expected_value(agent, s, &a)?;
            agent.update_state_value(s, v)?;
            max_error = max_error.max((current - v).abs());
        }

        if max_error < control.theta {
            return Ok(sweep);
        }
    }

    warn!(
        max_sweeps = control.max_sweeps,
        "policy evaluation did not settle"
    );
    Ok(control.max_sweeps)
}

/// Greedy policy improvement. Returns whether no action changed.
fn improve_policy(agent: &mut DpAgent, states: &[State]) -> Result<bool> {
    let mut policy_stable = true;
    for s in states {
        if agent.is_terminal(s)? {
            continue;
        }

        let old = agent.policy_action(s)?.clone();
        if let Some(best) = argmax_action(agent, s)? {
            agent.update_policy(s, &best)?;
            if best != old {
                policy_stable = false;
            }
        }
    }

    Ok(policy_stable)
}

/// Policy iteration - Sutton & Barto 2018, 4.3.
pub fn policy_iteration(agent: &mut DpAgent, control: &ControlConfig) -> Result<PolicyIterationOutcome> {
    agent.randomise_state_values()?;
    agent.randomise_policy()?;

    let states = agent.perceived_states();
    for i in 0..control.max_iterations {
        let sweeps = evaluate_policy(agent, &states, control)?;
        let policy_stable = improve_policy(agent, &states)?;
        debug!(iteration = i + 1, sweeps, policy_stable, "policy iteration step");

        if policy_stable {
            info!(iterations = i + 1, "policy iteration converged");
            return Ok(PolicyIterationOutcome {
                policy_stable,
                iterations: i + 1,
            });
        }
    }

    info!(
        iterations = control.max_iterations,
        "policy iteration stopped at the iteration cap"
    );
    Ok(PolicyIterationOutcome {
        policy_stable: false,
        iterations: control.max_iterations,
    })
}
