//! Classical control algorithms over a small finite MDP, each of which
//! records every change it makes to an agent as an [`activity::Activity`].

pub mod activity;
pub mod agents;
pub mod algos;
pub mod config;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod playback;

pub use error::{Error, Result};
