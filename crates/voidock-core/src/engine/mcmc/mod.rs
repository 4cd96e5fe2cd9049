//! Markov-chain search over arbitrary states.
//!
//! An engine owns an [`ActionRegistry`](actions::ActionRegistry) built at construction
//! time and a seeded random generator. Each trial samples one action uniformly, applies
//! it to a copy of the current state and keeps the copy only when the acceptance rule
//! agrees. [`Metropolis`](metropolis::Metropolis) replaces the default coin-flip with the
//! Boltzmann criterion under a [`TemperatureProfile`](temperature::TemperatureProfile).

pub mod actions;
pub mod chain;
pub mod metropolis;
pub mod temperature;

pub use actions::{Action, ActionRegistry};
pub use chain::{MarkovChain, MarkovChainMc};
pub use metropolis::Metropolis;
pub use temperature::TemperatureProfile;
