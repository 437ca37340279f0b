//! Ordered record of every mutation an agent performs.
//!
//! The log is the only thing a renderer gets to see. Each entry serializes
//! to a JSON array whose first element is the tag, followed by the payload:
//!
//! ```text
//! ["Start animation"]
//! ["State Value update", "class1", 0.41, -1.2]
//! ["Action Value update", ["class1", "study"], 0.41, -1.2]
//! ["Policy update", "class1", "facebook", "study"]
//! ["Sampled action", ["class1", "study"]]
//! ["End animation"]
//! ```

use crate::error::Result;
use crate::mdps::mdp::{Action, State};
use itertools::Itertools;
use serde::ser::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    StartAnimation,
    StateValueInitiate(Vec<(State, f64)>),
    ActionValueInitiate(Vec<((State, Action), f64)>),
    PolicyInitiate(Vec<(State, Action)>),
    StateValueUpdate {
        state: State,
        old: f64,
        new: f64,
    },
    ActionValueUpdate {
        state: State,
        action: Action,
        old: f64,
        new: f64,
    },
    PolicyUpdate {
        state: State,
        old: Action,
        new: Action,
    },
    BeginSimulation,
    SampledState(State),
    SampledAction(State, Action),
    EndSimulation,
    EndAnimation,
}

impl Activity {
    pub const TAGS: [&'static str; 12] = [
        "Start animation",
        "End animation",
        "State Value initiate",
        "Action Value initiate",
        "Policy initiate",
        "State Value update",
        "Action Value update",
        "Policy update",
        "Begin simulation",
        "Sampled state",
        "Sampled action",
        "End simulation",
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::StartAnimation => "Start animation",
            Self::EndAnimation => "End animation",
            Self::StateValueInitiate(_) => "State Value initiate",
            Self::ActionValueInitiate(_) => "Action Value initiate",
            Self::PolicyInitiate(_) => "Policy initiate",
            Self::StateValueUpdate { .. } => "State Value update",
            Self::ActionValueUpdate { .. } => "Action Value update",
            Self::PolicyUpdate { .. } => "Policy update",
            Self::BeginSimulation => "Begin simulation",
            Self::SampledState(_) => "Sampled state",
            Self::SampledAction(..) => "Sampled action",
            Self::EndSimulation => "End simulation",
        }
    }
}

impl Serialize for Activity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let tag = self.tag();
        match self {
            Self::StartAnimation
            | Self::EndAnimation
            | Self::BeginSimulation
            | Self::EndSimulation => (tag,).serialize(serializer),
            Self::StateValueInitiate(values) => (tag, values).serialize(serializer),
            Self::ActionValueInitiate(values) => (tag, values).serialize(serializer),
            Self::PolicyInitiate(choices) => (tag, choices).serialize(serializer),
            Self::StateValueUpdate { state, old, new } => (tag, state, old, new).serialize(serializer),
            Self::ActionValueUpdate {
                state,
                action,
                old,
                new,
            } => (tag, (state, action), old, new).serialize(serializer),
            Self::PolicyUpdate { state, old, new } => (tag, state, old, new).serialize(serializer),
            Self::SampledState(state) => (tag, state).serialize(serializer),
            Self::SampledAction(state, action) => (tag, (state, action)).serialize(serializer),
        }
    }
}

/// Append-only log. Opened with `Start animation`, closed by [`ActivityLog::finish`].
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Vec<Activity>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: vec![Activity::StartAnimation],
        }
    }

    pub fn record(&mut self, activity: Activity) {
        self.entries.push(activity);
    }

    pub fn begin_simulation(&mut self) {
        self.record(Activity::BeginSimulation);
    }

    pub fn end_simulation(&mut self) {
        self.record(Activity::EndSimulation);
    }

    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    /// Closes the log with `End animation`.
    pub fn finish(mut self) -> Vec<Activity> {
        self.entries.push(Activity::EndAnimation);
        self.entries
    }
}

pub fn to_json(entries: &[Activity], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(entries)?
    } else {
        serde_json::to_string(entries)?
    };

    Ok(json)
}

/// Number of entries per tag, in [`Activity::TAGS`] order. Tags that never
/// occur are left out.
pub fn tag_counts(entries: &[Activity]) -> Vec<(&'static str, usize)> {
    let counts = entries.iter().map(Activity::tag).counts();
    Activity::TAGS
        .iter()
        .filter_map(|&tag| counts.get(tag).map(|&n| (tag, n)))
        .collect()
}
