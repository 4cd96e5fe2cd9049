//! # Fitness Module
//!
//! Scalar scores for host-guest configurations. By convention a non-negative value
//! marks a geometrically acceptable configuration and a negative value (including
//! negative infinity) a rejected one.
//!
//! ## Key Components
//!
//! - [`threshold`] - Minimum, mean and sum-of-inverse distance thresholds
//! - [`target`] - Gaussian rewards around a target distance
//! - [`cation_anion`] - Two-stage gate pairing a guest cation with host anion sites
//! - [`composite`] - Weighted sums and step normalization
//!
//! Every fitness is a deterministic function of the geometry it is given. Failures
//! (an empty distance set, missing charge sites) are reported through [`Fitness::score`]
//! and collapse to the rejection sentinel in [`Fitness::evaluate`], so a single bad
//! candidate never aborts a search.

pub mod cation_anion;
pub mod composite;
pub mod target;
pub mod threshold;

use crate::core::models::traits::Scoreable;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Value returned for rejected configurations.
pub const REJECTED: f64 = f64::NEG_INFINITY;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitnessError {
    #[error("No {scope} distances below the cutoff of {cutoff} Å")]
    EmptyDistanceSet { scope: Scope, cutoff: f64 },

    #[error("The {0} distance set is empty")]
    EmptyScope(Scope),

    #[error("Charge sites could not be located: {0}")]
    ChargeSitesNotFound(String),

    #[error("Unknown distance scope '{0}'. Expected one of: complex, host, guest")]
    UnknownScope(String),
}

pub trait Fitness<S: ?Sized>: Send + Sync {
    /// Raw score, or the reason it could not be computed.
    fn score(&self, state: &S) -> Result<f64, FitnessError>;

    /// Score with failures mapped to [`REJECTED`].
    fn evaluate(&self, state: &S) -> f64 {
        match self.score(state) {
            Ok(value) => value,
            Err(e) => {
                trace!(error = %e, "Fitness evaluation rejected the configuration.");
                REJECTED
            }
        }
    }
}

impl<S: ?Sized, F> Fitness<S> for F
where
    F: Fn(&S) -> f64 + Send + Sync,
{
    fn score(&self, state: &S) -> Result<f64, FitnessError> {
        Ok(self(state))
    }
}

pub type SharedFitness<S> = Arc<dyn Fitness<S>>;

/// Which set of pairwise distances a fitness looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Host-guest distances.
    #[default]
    #[serde(rename = "complex", alias = "cross")]
    Cross,
    /// Host-host distances, each unordered pair once.
    Host,
    /// Guest-guest distances, each unordered pair once.
    Guest,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Cross => "complex",
            Scope::Host => "host",
            Scope::Guest => "guest",
        };
        f.write_str(name)
    }
}

impl FromStr for Scope {
    type Err = FitnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complex" | "cross" => Ok(Scope::Cross),
            "host" => Ok(Scope::Host),
            "guest" => Ok(Scope::Guest),
            other => Err(FitnessError::UnknownScope(other.to_string())),
        }
    }
}

impl Scope {
    /// All distances in the scope, flattened. Internal scopes use the strict upper
    /// triangle, so self-pairs never appear.
    pub fn distances<S: Scoreable + ?Sized>(self, state: &S) -> Vec<f64> {
        match self {
            Scope::Cross => state.cross_distances().iter().copied().collect(),
            Scope::Host => upper_triangle(&state.host_distances()),
            Scope::Guest => upper_triangle(&state.guest_distances()),
        }
    }

    /// For each site of the scoped body, the distance to its nearest partner.
    ///
    /// For [`Scope::Cross`] this is one entry per guest site (nearest host site);
    /// for the internal scopes one entry per site (nearest other site of the same body).
    pub fn nearest_neighbor_distances<S: Scoreable + ?Sized>(self, state: &S) -> Vec<f64> {
        match self {
            Scope::Cross => {
                let d = state.cross_distances();
                if d.nrows() == 0 {
                    return Vec::new();
                }
                d.column_iter()
                    .map(|col| col.iter().copied().fold(f64::INFINITY, f64::min))
                    .collect()
            }
            Scope::Host => nearest_other(&state.host_distances()),
            Scope::Guest => nearest_other(&state.guest_distances()),
        }
    }
}

fn upper_triangle(matrix: &nalgebra::DMatrix<f64>) -> Vec<f64> {
    (0..matrix.nrows())
        .tuple_combinations()
        .map(|(i, j)| matrix[(i, j)])
        .collect()
}

fn nearest_other(matrix: &nalgebra::DMatrix<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i)
                .map(|j| matrix[(i, j)])
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

pub(crate) fn min_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub(crate) fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub(crate) fn mean_of(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::core::models::body::Body;
    use crate::core::models::complex::Complex;
    use crate::core::models::site::Site;
    use nalgebra::Point3;

    pub fn body(element: &str, points: &[[f64; 3]]) -> Body {
        Body::new(
            points
                .iter()
                .map(|&[x, y, z]| Site::new(element, Point3::new(x, y, z)))
                .collect(),
        )
    }

    /// Host: two sites on the x axis at 0 and 4. Guest: sites at x = 2 (y = 1, -1).
    pub fn simple_complex() -> Complex {
        Complex::new(
            body("Si", &[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]]),
            body("C", &[[2.0, 1.0, 0.0], [2.0, -1.5, 0.0]]),
        )
    }
}
