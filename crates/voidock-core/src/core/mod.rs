//! # Core Module
//!
//! Stateless building blocks consumed by the search engine.
//!
//! - **Structural Models** ([`models`]) - Sites, bodies and host-guest complexes, plus the
//!   narrow capability traits (`Scoreable`, `Perturbable`, `Sampleable`) the engine relies on
//! - **Fitness** ([`fitness`]) - Distance-threshold predicates and their composites
//! - **Samplers** ([`samplers`]) - Anchor points where guests are docked
//! - **Utilities** ([`utils`]) - Rotation and random-sampling geometry

pub mod fitness;
pub mod models;
pub mod samplers;
pub mod utils;
