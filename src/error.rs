//! Error types for the crate

use rand::distributions::WeightedError;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown state '{state}'")]
    UnknownState { state: String },

    #[error("action '{action}' is not available in state '{state}'")]
    UnknownAction { state: String, action: String },

    #[error("no transition recorded for ('{state}', '{action}') -> '{next_state}'")]
    UnknownTransition {
        state: String,
        action: String,
        next_state: String,
    },

    #[error("value of state '{state}' was never initialised")]
    MissingStateValue { state: String },

    #[error("value of action ('{state}', '{action}') was never initialised")]
    MissingActionValue { state: String, action: String },

    #[error("no policy installed for state '{state}'")]
    MissingPolicy { state: String },

    #[error("non-terminal state '{state}' has no available actions")]
    NoActionsAvailable { state: String },

    #[error("the MDP declares no start states")]
    NoStartStates,

    #[error("cannot sample from '{context}': {source}")]
    InvalidWeights {
        context: String,
        #[source]
        source: WeightedError,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
