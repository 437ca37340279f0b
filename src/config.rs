//! Hyperparameters and iteration budgets for a learning run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters owned by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Discount factor γ.
    pub gamma: f64,
    /// Exploration mass ε of the epsilon-soft policy.
    pub epsilon: f64,
    /// TD learning rate α.
    pub alpha: f64,
    /// Seed for the agent's random source. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 1.,
            epsilon: 0.1,
            alpha: 0.1,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }
}

/// Budgets of the control loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Policy evaluation stops once the largest change of a sweep is below this.
    pub theta: f64,
    /// Outer policy iteration cap.
    pub max_iterations: usize,
    /// Sweep cap of one policy evaluation. Improper policies never settle
    /// when γ = 1.
    pub max_sweeps: usize,
    /// Episodes run by Monte Carlo control and SARSA.
    pub episodes: usize,
    /// Step cap of a Monte Carlo sample episode.
    pub max_episode_steps: usize,
    /// Step cap of a SARSA episode.
    pub max_td_steps: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            theta: 0.1,
            max_iterations: 100,
            max_sweeps: 1000,
            episodes: 5,
            max_episode_steps: 10,
            max_td_steps: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub control: ControlConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config '{}'", path.display()),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.agent.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let AgentConfig {
            gamma,
            epsilon,
            alpha,
            ..
        } = self.agent;

        if !(0.0..=1.0).contains(&gamma) {
            return Err(invalid(format!("gamma {gamma} must lie in [0, 1]")));
        }
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(invalid(format!("epsilon {epsilon} must lie in [0, 1]")));
        }
        if !(alpha > 0. && alpha <= 1.) {
            return Err(invalid(format!("alpha {alpha} must lie in (0, 1]")));
        }
        if !(self.control.theta > 0.) {
            return Err(invalid(format!(
                "theta {} must be positive",
                self.control.theta
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfiguration { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn defaults_match_the_classic_assignment_settings() {
        let config = Config::default();

        assert_eq!(config.agent.gamma, 1.);
        assert_eq!(config.agent.epsilon, 0.1);
        assert_eq!(config.agent.alpha, 0.1);
        assert_eq!(config.control.theta, 0.1);
        assert_eq!(config.control.max_iterations, 100);
        assert_eq!(config.control.episodes, 5);
        assert_eq!(config.control.max_episode_steps, 10);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            Config::from_json_str(r#"{ "agent": { "seed": 7 }, "control": { "episodes": 50 } }"#)
                .unwrap();

        assert_eq!(config.agent.seed, Some(7));
        assert_eq!(config.agent.epsilon, 0.1);
        assert_eq!(config.control.episodes, 50);
        assert_eq!(config.control.max_episode_steps, 10);
    }

    #[rstest]
    #[case(r#"{ "agent": { "epsilon": 1.5 } }"#)]
    #[case(r#"{ "agent": { "alpha": 0.0 } }"#)]
    #[case(r#"{ "agent": { "gamma": -0.1 } }"#)]
    #[case(r#"{ "control": { "theta": 0.0 } }"#)]
    fn out_of_range_values_are_rejected(#[case] json: &str) {
        let err = Config::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn missing_file_reports_the_operation() {
        let err = Config::from_json_file("/nonexistent/rl-activity.json").unwrap_err();
        assert!(err.to_string().starts_with("failed to read config"));
    }
}
