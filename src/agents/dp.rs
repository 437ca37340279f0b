use super::{Agent, Knowledge};
use crate::activity::Activity;
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::mdps::mdp::*;
use std::collections::HashMap;
use std::rc::Rc;

/// Agent with a deterministic policy, driven by dynamic programming.
pub struct DpAgent {
    knowledge: Knowledge,
    policy: HashMap<State, Action>,
}

impl DpAgent {
    pub fn perceive(mdp: Rc<dyn Mdp>, config: AgentConfig) -> Self {
        Self {
            knowledge: Knowledge::perceive(mdp, config),
            policy: HashMap::new(),
        }
    }

    pub fn policy_action(&self, s: &str) -> Result<&Action> {
        self.policy.get(s).ok_or_else(|| Error::MissingPolicy {
            state: s.to_string(),
        })
    }

    pub fn policy(&self) -> &HashMap<State, Action> {
        &self.policy
    }

    /// Installs a uniformly chosen action in every state that has one.
    pub fn randomise_policy(&mut self) -> Result<()> {
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

    pub fn into_activity_log(self) -> Vec<Activity> {
        self.knowledge.into_activity_log()
    }
}

impl Agent for DpAgent {
    fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    fn knowledge_mut(&mut self) -> &mut Knowledge {
        &mut self.knowledge
    }

    fn is_terminal(&self, s: &str) -> Result<bool> {
        Ok(self.knowledge.perceived_actions(s)?.is_empty())
    }

    /// Logs the replaced action even when it is the same as `best`.
    fn update_policy(&mut self, s: &str, best: &str) -> Result<()> {
        if !self.knowledge.perceived_actions(s)?.iter().any(|a| a == best) {
            return Err(Error::UnknownAction {
                state: s.to_string(),
                action: best.to_string(),
            });
        }

        if let Some(old) = self.policy.insert(s.to_string(), best.to_string()) {
            self.knowledge.record(Activity::PolicyUpdate {
                state: s.to_string(),
                old,
                new: best.to_string(),
            });
        }

        Ok(())
    }
}
