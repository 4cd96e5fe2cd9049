use super::{Fitness, FitnessError, Scope, max_of, mean_of, min_of};
use crate::core::models::traits::Scoreable;

pub const DEFAULT_TARGET: f64 = 1.5;
pub const DEFAULT_TOLERANCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetReduction {
    Min,
    /// Mean over sites of the nearest-neighbour distance.
    Mean,
    Max,
}

/// Rewards a reduced distance close to `target` with a Gaussian of width `tolerance`.
///
/// The score lies in `(0, 1]`, so this fitness never rejects on its own; wrap it in
/// a [`Stepped`](super::composite::Stepped) or combine it with a threshold when a hard
/// gate is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFitness {
    reduction: TargetReduction,
    target: f64,
    tolerance: f64,
    scope: Scope,
}

impl TargetFitness {
    pub fn new(reduction: TargetReduction, target: f64, tolerance: f64) -> Self {
        Self {
            reduction,
            target,
            tolerance,
            scope: Scope::default(),
        }
    }

    pub fn min_distance(target: f64, tolerance: f64) -> Self {
        Self::new(TargetReduction::Min, target, tolerance)
    }

    pub fn mean_distance(target: f64, tolerance: f64) -> Self {
        Self::new(TargetReduction::Mean, target, tolerance)
    }

    pub fn max_distance(target: f64, tolerance: f64) -> Self {
        Self::new(TargetReduction::Max, target, tolerance)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[inline]
    pub fn gaussian(&self, x: f64) -> f64 {
        let deviation = x - self.target;
        (-(deviation * deviation) / (2.0 * self.tolerance * self.tolerance)).exp()
    }
}

impl<S: Scoreable> Fitness<S> for TargetFitness {
    fn score(&self, state: &S) -> Result<f64, FitnessError> {
        let reduced = match self.reduction {
            TargetReduction::Min => min_of(&self.scope.distances(state)),
            TargetReduction::Mean => mean_of(&self.scope.nearest_neighbor_distances(state)),
            TargetReduction::Max => max_of(&self.scope.distances(state)),
        };
        let x = reduced.ok_or(FitnessError::EmptyScope(self.scope))?;
        Ok(self.gaussian(x))
    }
}
