use crate::activity::{Activity, ActivityLog};
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::mdps::mdp::*;
use crate::mdps::mdp_simulator::build_rng;
use rand::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;

/// Value tables, random source and activity log shared by every agent.
///
/// The MDP is handed over once, in [`Knowledge::perceive`]; everything the
/// agent knows about the environment comes from that snapshot.
pub struct Knowledge {
    mdp: Rc<dyn Mdp>,
    config: AgentConfig,
    rng: StdRng,
    state_values: HashMap<State, f64>,
    action_values: HashMap<State, HashMap<Action, f64>>,
    log: ActivityLog,
}

impl Knowledge {
    pub fn perceive(mdp: Rc<dyn Mdp>, config: AgentConfig) -> Self {
        Self {
            rng: build_rng(config.seed),
            mdp,
            config,
            state_values: HashMap::new(),
            action_values: HashMap::new(),
            log: ActivityLog::new(),
        }
    }

    pub fn perception(&self) -> Rc<dyn Mdp> {
        Rc::clone(&self.mdp)
    }

    pub fn perceived_states(&self) -> &[State] {
        self.mdp.states()
    }

    pub fn perceived_actions(&self, s: &str) -> Result<&[Action]> {
        self.mdp.actions(s)
    }

    pub fn perceived_next_states(&self, s: &str, a: &str) -> Result<Vec<&str>> {
        self.mdp.next_states(s, a)
    }

    pub fn perceived_start_states(&self) -> &[State] {
        self.mdp.start_states()
    }

    pub fn is_declared_terminal(&self, s: &str) -> bool {
        self.mdp.is_declared_terminal(s)
    }

    /// Probability and reward of `s -a-> next` and the current V(next).
    pub fn transition_info(&self, s: &str, a: &str, next: &str) -> Result<(f64, f64, f64)> {
        let p = self.mdp.transition_prob(s, a, next)?;
        let r = self.mdp.transition_reward(s, a, next)?;
        let v = self.state_value(next)?;
        Ok((p, r, v))
    }

    pub fn gamma(&self) -> f64 {
        self.config.gamma
    }

    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.alpha
    }

    pub fn state_value(&self, s: &str) -> Result<f64> {
        self.state_values
            .get(s)
            .copied()
            .ok_or_else(|| Error::MissingStateValue {
                state: s.to_string(),
            })
    }

    pub fn action_value(&self, s: &str, a: &str) -> Result<f64> {
        self.action_values
            .get(s)
            .and_then(|values| values.get(a))
            .copied()
            .ok_or_else(|| Error::MissingActionValue {
                state: s.to_string(),
                action: a.to_string(),
            })
    }

    /// Overwrites V(s). Replacing an existing value is logged.
    pub fn update_state_value(&mut self, s: &str, value: f64) -> Result<()> {
        self.mdp.actions(s)?;

        if let Some(old) = self.state_values.insert(s.to_string(), value) {
            self.log.record(Activity::StateValueUpdate {
                state: s.to_string(),
                old,
                new: value,
            });
        }

        Ok(())
    }

    /// Overwrites Q(s, a). Replacing an existing value is logged.
    pub fn update_action_value(&mut self, s: &str, a: &str, value: f64) -> Result<()> {
        if !self.mdp.actions(s)?.iter().any(|x| x == a) {
            return Err(Error::UnknownAction {
                state: s.to_string(),
                action: a.to_string(),
            });
        }

        let old = self
            .action_values
            .entry(s.to_string())
            .or_default()
            .insert(a.to_string(), value);
        if let Some(old) = old {
            self.log.record(Activity::ActionValueUpdate {
                state: s.to_string(),
                action: a.to_string(),
                old,
                new: value,
            });
        }

        Ok(())
    }

    /// Uniform [0, 1) value for every state, summarised by one initiate entry.
    pub fn randomise_state_values(&mut self) -> Result<()> {
        let mdp = self.perception();
        let mut initial = Vec::with_capacity(mdp.states().len());
        for s in mdp.states() {
            let value = self.rng.gen::<f64>();
            self.update_state_value(s, value)?;
            initial.push((s.clone(), value));
        }
        self.log.record(Activity::StateValueInitiate(initial));

        Ok(())
    }

    /// Uniform [0, 1) value for every `(s, a)`, summarised by one initiate entry.
    pub fn randomise_action_values(&mut self) -> Result<()> {
        let mdp = self.perception();
        let mut initial = vec![];
        for s in mdp.states() {
            for a in mdp.actions(s)? {
                let value = self.rng.gen::<f64>();
                self.update_action_value(s, a, value)?;
                initial.push(((s.clone(), a.clone()), value));
            }
        }
        self.log.record(Activity::ActionValueInitiate(initial));

        Ok(())
    }

    /// Action with the highest Q(s, ·). Ties go to the later action in
    /// perception order. `None` when the state has no actions.
    pub fn greedy_action(&self, s: &str) -> Result<Option<Action>> {
        let mut best_action = None;
        let mut best_value = f64::NEG_INFINITY;
        for a in self.mdp.actions(s)? {
            let q = self.action_value(s, a)?;
            if q >= best_value {
                best_action = Some(a);
                best_value = q;
            }
        }

        Ok(best_action.cloned())
    }

    /// Uniform choice among the action choices of `s`.
    pub fn random_action(&mut self, s: &str) -> Result<Option<Action>> {
        Ok(self.mdp.actions(s)?.choose(&mut self.rng).cloned())
    }

    pub fn sample_start_state(&mut self) -> Result<State> {
        self.mdp
            .start_states()
            .choose(&mut self.rng)
            .cloned()
            .ok_or(Error::NoStartStates)
    }

    pub fn sample_transition(&mut self, s: &str, a: &str) -> Result<(State, f64)> {
        self.mdp.sample_transition(s, a, &mut self.rng)
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn record(&mut self, activity: Activity) {
        self.log.record(activity);
    }

    pub fn begin_simulation(&mut self) {
        self.log.begin_simulation();
    }

    pub fn end_simulation(&mut self) {
        self.log.end_simulation();
    }

    pub fn activity_log(&self) -> &[Activity] {
        self.log.entries()
    }

    pub fn into_activity_log(self) -> Vec<Activity> {
        self.log.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::SimpleGolf;
    use assertor::*;

    fn knowledge() -> Knowledge {
        Knowledge::perceive(
            Rc::new(SimpleGolf::mdp().unwrap()),
            AgentConfig::default().with_seed(11),
        )
    }

    #[test]
    fn values_are_not_defaulted() {
        let k = knowledge();

        assert!(matches!(
            k.state_value("green"),
            Err(Error::MissingStateValue { .. })
        ));
        assert!(matches!(
            k.action_value("green", "putt"),
            Err(Error::MissingActionValue { .. })
        ));
    }

    #[test]
    fn first_write_is_silent_and_overwrites_are_logged() {
        let mut k = knowledge();

        k.update_state_value("green", 1.).unwrap();
        k.update_state_value("green", 2.).unwrap();
        k.update_action_value("green", "putt", 3.).unwrap();
        k.update_action_value("green", "putt", 4.).unwrap();

        assert_eq!(k.state_value("green").unwrap(), 2.);
        assert_eq!(k.action_value("green", "putt").unwrap(), 4.);
        assert_eq!(
            k.activity_log()[1..],
            [
                Activity::StateValueUpdate {
                    state: "green".into(),
                    old: 1.,
                    new: 2.,
                },
                Activity::ActionValueUpdate {
                    state: "green".into(),
                    action: "putt".into(),
                    old: 3.,
                    new: 4.,
                },
            ]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut k = knowledge();

        assert!(matches!(
            k.update_state_value("bunker", 1.),
            Err(Error::UnknownState { .. })
        ));
        assert!(matches!(
            k.update_action_value("fairway", "putt", 1.),
            Err(Error::UnknownAction { .. })
        ));
    }

    #[test]
    fn randomise_state_values_logs_one_initiate_entry() {
        let mut k = knowledge();
        k.randomise_state_values().unwrap();

        let log = k.activity_log();
        assert_that!(log.to_vec()).has_length(2);
        match &log[1] {
            Activity::StateValueInitiate(values) => {
                assert_that!(values.to_vec()).has_length(3);
                for (s, v) in values {
                    assert!((0.0..1.0).contains(v));
                    assert_eq!(k.state_value(s).unwrap(), *v);
                }
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn randomise_twice_logs_updates_before_the_second_initiate() {
        let mut k = knowledge();
        k.randomise_action_values().unwrap();
        k.randomise_action_values().unwrap();

        let tags = k.activity_log().iter().map(Activity::tag).collect::<Vec<_>>();
        assert_eq!(
            tags,
            vec![
                "Start animation",
                "Action Value initiate",
                "Action Value update",
                "Action Value update",
                "Action Value update",
                "Action Value initiate",
            ]
        );
    }

    #[test]
    fn greedy_action_breaks_ties_towards_the_later_action() {
        let mut k = knowledge();
        k.update_action_value("green", "chip", 0.5).unwrap();
        k.update_action_value("green", "putt", 0.5).unwrap();
        assert_eq!(k.greedy_action("green").unwrap().as_deref(), Some("putt"));

        k.update_action_value("green", "chip", 0.6).unwrap();
        assert_eq!(k.greedy_action("green").unwrap().as_deref(), Some("chip"));

        assert_eq!(k.greedy_action("hole").unwrap(), None);
    }

    #[test]
    fn transition_info_reads_the_current_state_value() {
        let mut k = knowledge();
        k.update_state_value("hole", 0.25).unwrap();

        assert_eq!(k.transition_info("green", "putt", "hole").unwrap(), (0.9, 10., 0.25));
        assert!(matches!(
            k.transition_info("green", "putt", "green"),
            Err(Error::MissingStateValue { .. })
        ));
    }

    #[test]
    fn simulation_markers_go_through_the_log() {
        let mut k = knowledge();
        k.begin_simulation();
        let s = k.sample_start_state().unwrap();
        k.record(Activity::SampledState(s.clone()));
        k.end_simulation();

        assert_eq!(s, "fairway");
        assert_eq!(
            k.activity_log()[1..],
            [
                Activity::BeginSimulation,
                Activity::SampledState("fairway".into()),
                Activity::EndSimulation,
            ]
        );
    }

    #[test]
    fn finished_log_is_closed() {
        let mut k = knowledge();
        k.randomise_state_values().unwrap();
        let log = k.into_activity_log();

        assert_eq!(log.first(), Some(&Activity::StartAnimation));
        assert_eq!(log.last(), Some(&Activity::EndAnimation));
    }
}
