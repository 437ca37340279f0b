use super::mdp_simulator::*;
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub type State = String;
pub type Action = String;

/// Probability and reward of one `(state, action) -> next_state` edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Transition {
    pub probability: f64,
    pub reward: f64,
}

impl From<(f64, f64)> for Transition {
    fn from((probability, reward): (f64, f64)) -> Self {
        Self {
            probability,
            reward,
        }
    }
}

impl From<Transition> for (f64, f64) {
    fn from(t: Transition) -> Self {
        (t.probability, t.reward)
    }
}

/// state -> action -> next_state -> (probability, reward)
pub type MdpGraph = IndexMap<State, IndexMap<Action, IndexMap<State, Transition>>>;

/// On-disk description of an MDP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdpDescription {
    pub start_states: Vec<State>,
    pub structure: MdpGraph,
}

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Finite, with string identified states and actions. Orders are the ones of
/// the underlying description and are stable across calls.
pub trait Mdp {
    fn states(&self) -> &[State];

    /// Empty iff the state has no outgoing edges.
    fn actions(&self, s: &str) -> Result<&[Action]>;

    /// States reachable with non-zero probability.
    fn next_states(&self, s: &str, a: &str) -> Result<Vec<&str>>;

    fn transition_prob(&self, s: &str, a: &str, next: &str) -> Result<f64>;

    fn transition_reward(&self, s: &str, a: &str, next: &str) -> Result<f64>;

    fn start_states(&self) -> &[State];

    fn terminal_states(&self) -> &IndexSet<State>;

    fn is_declared_terminal(&self, s: &str) -> bool {
        self.terminal_states().contains(s)
    }

    /// Draws the next state and its reward for `(s, a)`.
    fn sample_transition(&self, s: &str, a: &str, rng: &mut StdRng) -> Result<(State, f64)> {
        let choices = self
            .next_states(s, a)?
            .into_iter()
            .map(|next| Ok((next, self.transition_prob(s, a, next)?)))
            .collect::<Result<Vec<_>>>()?;

        let next = pick_next(rng, &choices).map_err(|source| Error::InvalidWeights {
            context: format!("transitions of ('{s}', '{a}')"),
            source,
        })?;
        let reward = self.transition_reward(s, a, next)?;

        Ok((next.to_string(), reward))
    }
}

/// An MDP read from a static transition graph.
#[derive(Debug, Clone)]
pub struct GraphMdp {
    structure: MdpGraph,
    states: Vec<State>,
    actions: IndexMap<State, Vec<Action>>,
    start_states: Vec<State>,
    terminal_states: IndexSet<State>,
}

impl GraphMdp {
    /// Terminal states are derived: the ones without outgoing actions.
    pub fn from_graph<I, S>(structure: MdpGraph, start_states: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        let states = structure.keys().cloned().collect::<Vec<_>>();
        let actions = structure
            .iter()
            .map(|(s, acts)| (s.clone(), acts.keys().cloned().collect()))
            .collect::<IndexMap<State, Vec<Action>>>();
        let terminal_states = actions
            .iter()
            .filter(|(_, acts)| acts.is_empty())
            .map(|(s, _)| s.clone())
            .collect();

        for next in structure
            .values()
            .flat_map(|acts| acts.values())
            .flat_map(|nexts| nexts.keys())
        {
            if !structure.contains_key(next) {
                return Err(Error::UnknownState {
                    state: next.clone(),
                });
            }
        }

        let start_states = start_states.into_iter().map(Into::into).collect::<Vec<State>>();
        if start_states.is_empty() {
            return Err(Error::NoStartStates);
        }
        if let Some(s) = start_states.iter().find(|s| !structure.contains_key(*s)) {
            return Err(Error::UnknownState { state: s.clone() });
        }

        Ok(Self {
            structure,
            states,
            actions,
            start_states,
            terminal_states,
        })
    }

    pub fn from_description(description: MdpDescription) -> Result<Self> {
        Self::from_graph(description.structure, description.start_states)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_description(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read MDP description '{}'", path.display()),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Replaces the derived terminal set.
    pub fn with_terminal_states<I, S>(mut self, terminal_states: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        let terminal_states = terminal_states
            .into_iter()
            .map(Into::into)
            .collect::<IndexSet<State>>();
        if let Some(s) = terminal_states.iter().find(|s| !self.structure.contains_key(*s)) {
            return Err(Error::UnknownState { state: s.clone() });
        }

        self.terminal_states = terminal_states;
        Ok(self)
    }

    pub fn structure(&self) -> &MdpGraph {
        &self.structure
    }

    fn transition(&self, s: &str, a: &str, next: &str) -> Result<&Transition> {
        self.structure
            .get(s)
            .and_then(|acts| acts.get(a))
            .and_then(|nexts| nexts.get(next))
            .ok_or_else(|| Error::UnknownTransition {
                state: s.to_string(),
                action: a.to_string(),
                next_state: next.to_string(),
            })
    }
}

impl Mdp for GraphMdp {
    fn states(&self) -> &[State] {
        &self.states
    }

    fn actions(&self, s: &str) -> Result<&[Action]> {
        self.actions
            .get(s)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownState {
                state: s.to_string(),
            })
    }

    fn next_states(&self, s: &str, a: &str) -> Result<Vec<&str>> {
        let acts = self.structure.get(s).ok_or_else(|| Error::UnknownState {
            state: s.to_string(),
        })?;
        let nexts = acts.get(a).ok_or_else(|| Error::UnknownAction {
            state: s.to_string(),
            action: a.to_string(),
        })?;

        Ok(nexts
            .iter()
            .filter(|(_, t)| t.probability > 0.)
            .map(|(next, _)| next.as_str())
            .collect())
    }

    fn transition_prob(&self, s: &str, a: &str, next: &str) -> Result<f64> {
        Ok(self.transition(s, a, next)?.probability)
    }

    fn transition_reward(&self, s: &str, a: &str, next: &str) -> Result<f64> {
        Ok(self.transition(s, a, next)?.reward)
    }

    fn start_states(&self) -> &[State] {
        &self.start_states
    }

    fn terminal_states(&self) -> &IndexSet<State> {
        &self.terminal_states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::SimpleGolf;
    use assertor::*;
    use float_eq::*;

    #[test]
    fn golf_structure_is_perceived_in_graph_order() {
        let mdp = SimpleGolf::mdp().unwrap();

        assert_eq!(mdp.states(), ["fairway", "green", "hole"].map(String::from));
        assert_eq!(mdp.actions("green").unwrap(), ["chip", "putt"].map(String::from));
        assert_that!(mdp.actions("hole").unwrap().to_vec()).is_empty();
        assert_eq!(mdp.next_states("green", "putt").unwrap(), vec!["hole", "green"]);
    }

    #[test]
    fn terminal_states_are_derived_from_missing_actions() {
        let mdp = SimpleGolf::mdp().unwrap();

        assert!(mdp.is_declared_terminal("hole"));
        assert!(!mdp.is_declared_terminal("green"));
        assert_eq!(mdp.start_states(), ["fairway".to_string()]);
    }

    #[test]
    fn transition_lookups() {
        let mdp = SimpleGolf::mdp().unwrap();

        assert_float_eq!(mdp.transition_prob("green", "putt", "hole").unwrap(), 0.9, abs <= 1e-12);
        assert_float_eq!(mdp.transition_reward("green", "putt", "hole").unwrap(), 10., abs <= 1e-12);
        assert!(matches!(
            mdp.transition_prob("fairway", "drive", "hole"),
            Err(Error::UnknownTransition { .. })
        ));
        assert!(matches!(mdp.actions("bunker"), Err(Error::UnknownState { .. })));
        assert!(matches!(
            mdp.next_states("fairway", "putt"),
            Err(Error::UnknownAction { .. })
        ));
    }

    #[test]
    fn zero_probability_edges_are_not_reachable() {
        let json = r#"{
            "start_states": ["a"],
            "structure": {
                "a": { "go": { "b": [1.0, 1.0], "a": [0.0, 0.0] } },
                "b": {}
            }
        }"#;
        let mdp = GraphMdp::from_json_str(json).unwrap();

        assert_eq!(mdp.next_states("a", "go").unwrap(), vec!["b"]);
        assert_float_eq!(mdp.transition_prob("a", "go", "a").unwrap(), 0., abs <= 1e-12);
    }

    #[test]
    fn sample_transition_follows_the_distribution() {
        let mdp = SimpleGolf::mdp().unwrap();
        let rng = &mut StdRng::seed_from_u64(2718);

        let n = 5000;
        let holed = (0..n)
            .map(|_| mdp.sample_transition("green", "putt", rng).unwrap())
            .filter(|(next, reward)| next == "hole" && *reward == 10.)
            .count();

        assert_float_eq!(holed as f64 / n as f64, 0.9, abs <= 2e-2);
    }

    #[test]
    fn explicit_terminal_set_overrides_derivation() {
        let mdp = SimpleGolf::mdp().unwrap().with_terminal_states(["green"]).unwrap();

        assert!(mdp.is_declared_terminal("green"));
        assert!(!mdp.is_declared_terminal("hole"));
        assert!(matches!(
            SimpleGolf::mdp().unwrap().with_terminal_states(["bunker"]),
            Err(Error::UnknownState { .. })
        ));
    }

    #[test]
    fn invalid_descriptions_fail_fast() {
        let dangling = r#"{ "start_states": ["a"], "structure": { "a": { "go": { "z": [1.0, 0.0] } } } }"#;
        assert!(matches!(
            GraphMdp::from_json_str(dangling),
            Err(Error::UnknownState { .. })
        ));

        let no_start = r#"{ "start_states": [], "structure": { "a": {} } }"#;
        assert!(matches!(
            GraphMdp::from_json_str(no_start),
            Err(Error::NoStartStates)
        ));

        assert!(matches!(
            GraphMdp::from_json_str("{"),
            Err(Error::Serialization(_))
        ));
    }
}
