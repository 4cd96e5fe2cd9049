//! # Engine Module
//!
//! The stateful search machinery of VOIDock: everything that owns a random generator
//! or iterates toward a stopping criterion.
//!
//! ## Overview
//!
//! Two families of search live here. One-shot docking builds many candidate poses at
//! sampled anchor points and ranks them; Markov-chain docking refines a single pose
//! with small random moves accepted by the Metropolis criterion. Both are exposed
//! through the same [`Docker`](docking::Docker) trait, so either can seed the
//! recursive loading loop that packs several guests into one host.
//!
//! ## Architecture
//!
//! - **Markov Chains** ([`mcmc`]) - Action registry, generic engine with lifecycle hooks,
//!   Metropolis acceptance and temperature profiles
//! - **Docking** ([`docking`]) - Candidate generators, ranking, the subdock loop and the
//!   Monte Carlo docker
//! - **Configuration** ([`config`]) - Validated run parameters and name lookups
//! - **State Tracking** ([`state`]) - Scored candidates
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type
//!
//! ## Key Capabilities
//!
//! - **Reproducible randomness**: every engine owns a seedable `StdRng`
//! - **Copy-on-attempt moves**: rejected proposals never touch the current state
//! - **Parallel batch transforms** behind the `parallel` feature

pub mod config;
pub mod docking;
pub mod error;
pub mod mcmc;
pub mod progress;
pub mod state;
