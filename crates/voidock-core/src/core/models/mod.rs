//! # Core Models Module
//!
//! Minimal Cartesian structural model used by the docking engine.
//!
//! ## Key Components
//!
//! - [`site`] - A single atom: element symbol and position
//! - [`body`] - An ordered collection of sites with an optional lattice
//! - [`complex`] - A host-guest pair; the state every docking search operates on
//! - [`traits`] - Capability traits decoupling the engine from the concrete model
//!
//! ## Usage
//!
//! ```ignore
//! use voidock::core::models::{body::Body, complex::Complex, site::Site};
//!
//! let host = Body::new(vec![Site::new("Si", Point3::new(0.0, 0.0, 0.0))]);
//! let guest = Body::new(vec![Site::new("C", Point3::new(3.0, 0.0, 0.0))]);
//! let complex = Complex::new(host, guest);
//! assert_eq!(complex.pose().len(), 2);
//! ```

pub mod body;
pub mod complex;
pub mod site;
pub mod traits;
