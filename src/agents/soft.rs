use super::{Agent, Knowledge};
use crate::activity::Activity;
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::mdps::mdp::*;
use crate::mdps::mdp_simulator::pick_next;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: State,
    pub action: Action,
    pub reward: f64,
}

/// One sampled trajectory. `final_state` is where the last step landed.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub steps: Vec<Step>,
    pub final_state: State,
}

/// Agent with an epsilon-soft policy, driven by sampled experience.
///
/// The greedy action of a state holds `1 - ε + ε/k` of the probability
/// mass, every other action `ε/k`, with `k` the number of action choices.
pub struct SoftAgent {
    knowledge: Knowledge,
    policy: HashMap<State, IndexMap<Action, f64>>,
}

impl SoftAgent {
    pub fn perceive(mdp: Rc<dyn Mdp>, config: AgentConfig) -> Self {
        Self {
            knowledge: Knowledge::perceive(mdp, config),
            policy: HashMap::new(),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.knowledge.epsilon()
    }

    pub fn learning_rate(&self) -> f64 {
        self.knowledge.learning_rate()
    }

    pub fn action_probability(&self, s: &str, a: &str) -> Result<f64> {
        let distribution = self.distribution(s)?;
        distribution
            .get(a)
            .copied()
            .ok_or_else(|| Error::UnknownAction {
                state: s.to_string(),
                action: a.to_string(),
            })
    }

    /// Action holding the most probability mass, first one on ties.
    pub fn policy_greedy_action(&self, s: &str) -> Result<&Action> {
        let mut best: Option<(&Action, f64)> = None;
        for (a, &p) in self.distribution(s)? {
            if best.map_or(true, |(_, best_p)| p > best_p) {
                best = Some((a, p));
            }
        }

        best.map(|(a, _)| a).ok_or_else(|| Error::MissingPolicy {
            state: s.to_string(),
        })
    }

    fn distribution(&self, s: &str) -> Result<&IndexMap<Action, f64>> {
        self.policy.get(s).ok_or_else(|| Error::MissingPolicy {
            state: s.to_string(),
        })
    }

    /// Uniformly chosen greedy action for every state with action choices.
    pub fn random_initialise_epsilon_soft_policy(&mut self) -> Result<()> {
        let mut initial = vec![];
        for s in self.perceived_states() {
            if let Some(a) = self.knowledge.random_action(&s)? {
                self.update_policy(&s, &a)?;
                initial.push((s, a));
            }
        }
        self.knowledge.record(Activity::PolicyInitiate(initial));

        Ok(())
    }

    /// Greedy action from the current Q for every non-terminal state.
    pub fn initialise_policy_according_to_action_values(&mut self) -> Result<()> {
        let mut initial = vec![];
        for s in self.perceived_states() {
            if self.is_terminal(&s)? {
                continue;
            }
            if let Some(a) = self.greedy_action(&s)? {
                self.update_policy(&s, &a)?;
                initial.push((s, a));
            }
        }
        self.knowledge.record(Activity::PolicyInitiate(initial));

        Ok(())
    }

    /// Samples an action from the policy. `None` for terminal states.
    pub fn choose_action_according_to_current_policy(&mut self, s: &str) -> Result<Option<Action>> {
        if self.is_terminal(s)? {
            return Ok(None);
        }

        self.sample_policy_action(s).map(Some)
    }

    fn sample_policy_action(&mut self, s: &str) -> Result<Action> {
        if self.knowledge.perceived_actions(s)?.is_empty() {
            return Err(Error::NoActionsAvailable {
                state: s.to_string(),
            });
        }

        let choices = self
            .policy
            .get(s)
            .ok_or_else(|| Error::MissingPolicy {
                state: s.to_string(),
            })?
            .iter()
            .map(|(a, &p)| (a.as_str(), p))
            .collect::<Vec<_>>();
        let action = pick_next(self.knowledge.rng_mut(), &choices)
            .map_err(|source| Error::InvalidWeights {
                context: format!("policy of '{s}'"),
                source,
            })?
            .to_string();

        trace!(state = s, action = %action, "sampled action");
        self.knowledge
            .record(Activity::SampledAction(s.to_string(), action.clone()));

        Ok(action)
    }

    fn sample_start_state(&mut self) -> Result<State> {
        let s = self.knowledge.sample_start_state()?;
        trace!(state = %s, "sampled start state");
        self.knowledge.record(Activity::SampledState(s.clone()));

        Ok(s)
    }

    fn sample_transition(&mut self, s: &str, a: &str) -> Result<(State, f64)> {
        let (next, reward) = self.knowledge.sample_transition(s, a)?;
        trace!(state = s, action = a, next = %next, reward, "sampled transition");
        self.knowledge.record(Activity::SampledState(next.clone()));

        Ok((next, reward))
    }

    /// Follows the policy from a uniformly drawn start state until a terminal
    /// state or `max_steps` transitions, whichever comes first.
    pub fn generate_sample_episode(&mut self, max_steps: usize) -> Result<Episode> {
        self.knowledge.begin_simulation();

        let mut state = self.sample_start_state()?;
        let mut steps = vec![];
        for _ in 0..max_steps {
            if self.is_terminal(&state)? {
                break;
            }

            let action = self.sample_policy_action(&state)?;
            let (next, reward) = self.sample_transition(&state, &action)?;
            steps.push(Step {
                state,
                action,
                reward,
            });
            state = next;
        }

        self.knowledge.end_simulation();

        Ok(Episode {
            steps,
            final_state: state,
        })
    }

    pub fn sample_initial_state_and_initial_action(&mut self) -> Result<(State, Option<Action>)> {
        self.knowledge.begin_simulation();
        let s = self.sample_start_state()?;
        let a = self.choose_action_according_to_current_policy(&s)?;
        self.knowledge.end_simulation();

        Ok((s, a))
    }

    /// One environment step from `(s, a)` followed by the policy's next action.
    pub fn sample_next_state_and_next_action(
        &mut self,
        s: &str,
        a: &str,
    ) -> Result<(State, f64, Option<Action>)> {
        self.knowledge.begin_simulation();
        let (next, reward) = self.sample_transition(s, a)?;
        let next_action = self.choose_action_according_to_current_policy(&next)?;
        self.knowledge.end_simulation();

        Ok((next, reward, next_action))
    }

    pub fn into_activity_log(self) -> Vec<Activity> {
        self.knowledge.into_activity_log()
    }
}

impl Agent for SoftAgent {
    fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    fn knowledge_mut(&mut self) -> &mut Knowledge {
        &mut self.knowledge
    }

    fn is_terminal(&self, s: &str) -> Result<bool> {
        self.knowledge.perceived_actions(s)?;
        Ok(self.knowledge.is_declared_terminal(s))
    }

    /// Rewrites the whole distribution of `s` around `best`. Logs the
    /// previously greedy action if `s` already had a distribution. States
    /// without actions are left alone.
    fn update_policy(&mut self, s: &str, best: &str) -> Result<()> {
        let actions = self.knowledge.perceived_actions(s)?;
        if actions.is_empty() {
            return Ok(());
        }
        if !actions.iter().any(|a| a == best) {
            return Err(Error::UnknownAction {
                state: s.to_string(),
                action: best.to_string(),
            });
        }

        let epsilon = self.knowledge.epsilon();
        let k = actions.len() as f64;
        let distribution = actions
            .iter()
            .map(|a| {
                let p = if a == best {
                    1. - epsilon + epsilon / k
                } else {
                    epsilon / k
                };
                (a.clone(), p)
            })
            .collect::<IndexMap<_, _>>();

        if self.policy.contains_key(s) {
            let old = self.policy_greedy_action(s)?.clone();
            self.knowledge.record(Activity::PolicyUpdate {
                state: s.to_string(),
                old,
                new: best.to_string(),
            });
        }
        self.policy.insert(s.to_string(), distribution);

        Ok(())
    }
}
