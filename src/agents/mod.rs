//! Agents: value tables plus a policy, with every mutation logged.
//!
//! [`DpAgent`] keeps a deterministic policy and is driven by policy
//! iteration. [`SoftAgent`] keeps an epsilon-soft policy and samples episodes
//! for Monte Carlo control and SARSA. The two deliberately disagree on what a
//! terminal state is:
//!
//! | Agent | `is_terminal(s)` |
//! |-------|------------------|
//! | `DpAgent` | `s` has no available actions |
//! | `SoftAgent` | `s` is in the MDP's declared terminal set |

pub mod dp;
pub mod knowledge;
pub mod soft;

pub use dp::DpAgent;
pub use knowledge::Knowledge;
pub use soft::{Episode, SoftAgent, Step};

use crate::activity::Activity;
use crate::error::Result;
use crate::mdps::mdp::{Action, State};

pub trait Agent {
    fn knowledge(&self) -> &Knowledge;

    fn knowledge_mut(&mut self) -> &mut Knowledge;

    fn is_terminal(&self, s: &str) -> Result<bool>;

    /// Makes `best` the preferred action of `s`.
    fn update_policy(&mut self, s: &str, best: &str) -> Result<()>;

    fn perceived_states(&self) -> Vec<State> {
        self.knowledge().perceived_states().to_vec()
    }

    fn perceived_actions(&self, s: &str) -> Result<Vec<Action>> {
        Ok(self.knowledge().perceived_actions(s)?.to_vec())
    }

    fn state_value(&self, s: &str) -> Result<f64> {
        self.knowledge().state_value(s)
    }

    fn action_value(&self, s: &str, a: &str) -> Result<f64> {
        self.knowledge().action_value(s, a)
    }

    fn update_state_value(&mut self, s: &str, value: f64) -> Result<()> {
        self.knowledge_mut().update_state_value(s, value)
    }

    fn update_action_value(&mut self, s: &str, a: &str, value: f64) -> Result<()> {
        self.knowledge_mut().update_action_value(s, a, value)
    }

    fn randomise_state_values(&mut self) -> Result<()> {
        self.knowledge_mut().randomise_state_values()
    }

    fn randomise_action_values(&mut self) -> Result<()> {
        self.knowledge_mut().randomise_action_values()
    }

    fn greedy_action(&self, s: &str) -> Result<Option<Action>> {
        self.knowledge().greedy_action(s)
    }

    fn gamma(&self) -> f64 {
        self.knowledge().gamma()
    }

    fn activity_log(&self) -> &[Activity] {
        self.knowledge().activity_log()
    }
}
