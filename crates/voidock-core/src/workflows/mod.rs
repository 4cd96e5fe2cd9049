//! # Workflows Module
//!
//! High-level entry points of VOIDock. A workflow takes a validated configuration,
//! a host and a guest, builds the fitness and sampler the configuration names, runs
//! the search and returns the ranked poses grouped by loading level.
//!
//! ## Architecture
//!
//! - **Docking Workflow** ([`dock`]) - One-shot docking at sampled anchor points with the
//!   batch, serial or success strategy
//! - **Monte Carlo Workflow** ([`mcdock`]) - Metropolis refinement of a single pose per call
//! - **Setup** ([`setup`]) - Turns configuration values into fitness functions, samplers and
//!   temperature profiles
//!
//! Both workflows optionally wrap their docker in the subdock loop to load several guests.

pub mod dock;
pub mod mcdock;
pub mod setup;

use crate::core::models::body::Body;
use crate::engine::config::ConfigError;
use crate::engine::docking::subdock::LoadingHistory;
use crate::engine::state::Candidate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DockingResult {
    pub history: LoadingHistory,
}

impl DockingResult {
    /// Every accepted pose, lowest loading first.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.history.flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Number of guests in the most loaded pose.
    pub fn loading(&self) -> usize {
        self.history.max_loading()
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.history.best()
    }
}

pub(crate) fn validate_bodies(host: &Body, guest: &Body) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidValue {
            parameter: "host",
            reason: "the host has no sites".to_string(),
        });
    }
    if guest.is_empty() {
        return Err(ConfigError::InvalidValue {
            parameter: "guest",
            reason: "the guest has no sites".to_string(),
        });
    }
    Ok(())
}
