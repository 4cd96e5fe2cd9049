//! # VOIDock Core Library
//!
//! Stochastic docking of a guest body (typically a molecule) inside a host body
//! (typically a porous framework), with support for packing several guests into
//! the same host.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split used throughout the code base:
//!
//! - **[`core`]: The Foundation.** Stateless structural models (`Body`, `Complex`),
//!   geometry helpers, composable fitness functions and anchor-point samplers.
//!
//! - **[`engine`]: The Logic Core.** The stateful search machinery: a generic
//!   Markov-chain engine with pluggable actions, the Metropolis acceptance rule,
//!   one-shot candidate generators, ranking and the recursive subdock loop.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together from a
//!   configuration value, reporting progress and returning ranked poses grouped by
//!   loading level.

pub mod core;
pub mod engine;
pub mod workflows;
