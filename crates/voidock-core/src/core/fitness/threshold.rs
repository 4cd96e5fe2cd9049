use super::{Fitness, FitnessError, Scope, mean_of, min_of};
use crate::core::models::traits::Scoreable;

pub const DEFAULT_THRESHOLD: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdReduction {
    /// `min(d) - threshold`
    Min,
    /// Mean over sites of the nearest-neighbour distance, minus the threshold.
    Mean,
    /// Negative mean of `1/d` over the distances below `2 * threshold`.
    SumInverse,
}

/// Distance-threshold fitness. Positive when the reduced distance clears the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdFitness {
    reduction: ThresholdReduction,
    threshold: f64,
    scope: Scope,
}

impl ThresholdFitness {
    pub fn new(reduction: ThresholdReduction, threshold: f64) -> Self {
        Self {
            reduction,
            threshold,
            scope: Scope::default(),
        }
    }

    pub fn min_distance(threshold: f64) -> Self {
        Self::new(ThresholdReduction::Min, threshold)
    }

    pub fn mean_distance(threshold: f64) -> Self {
        Self::new(ThresholdReduction::Mean, threshold)
    }

    pub fn sum_inverse_distance(threshold: f64) -> Self {
        Self::new(ThresholdReduction::SumInverse, threshold)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn reduction(&self) -> ThresholdReduction {
        self.reduction
    }
}

impl<S: Scoreable> Fitness<S> for ThresholdFitness {
    fn score(&self, state: &S) -> Result<f64, FitnessError> {
        match self.reduction {
            ThresholdReduction::Min => {
                let distances = self.scope.distances(state);
                let min = min_of(&distances).ok_or(FitnessError::EmptyScope(self.scope))?;
                Ok(min - self.threshold)
            }
            ThresholdReduction::Mean => {
                let nearest = self.scope.nearest_neighbor_distances(state);
                let mean = mean_of(&nearest).ok_or(FitnessError::EmptyScope(self.scope))?;
                Ok(mean - self.threshold)
            }
            ThresholdReduction::SumInverse => {
                let cutoff = 2.0 * self.threshold;
                let inverses: Vec<f64> = self
                    .scope
                    .distances(state)
                    .into_iter()
                    .filter(|&d| d < cutoff)
                    .map(|d| 1.0 / d)
                    .collect();
                let mean = mean_of(&inverses).ok_or(FitnessError::EmptyDistanceSet {
                    scope: self.scope,
                    cutoff,
                })?;
                Ok(-mean)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::REJECTED;
    use super::super::test_utils::{body, simple_complex};
    use super::*;
    use crate::core::models::complex::Complex;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn min_distance_subtracts_threshold_from_smallest_cross_distance() {
        let f = ThresholdFitness::min_distance(1.5);
        assert!(f64_approx_equal(f.evaluate(&simple_complex()), 5f64.sqrt() - 1.5));
    }

    #[test]
    fn min_distance_sign_matches_threshold_crossing() {
        let cpx = simple_complex();
        let min = cpx.min_cross_distance().unwrap();
        for threshold in [0.5, 1.0, min - 1e-6, min, min + 1e-6, 3.0, 10.0] {
            let value = ThresholdFitness::min_distance(threshold).evaluate(&cpx);
            assert_eq!(value >= 0.0, min >= threshold, "threshold {threshold}");
        }
    }

    #[test]
    fn min_distance_on_host_scope_uses_host_pairs_only() {
        let f = ThresholdFitness::min_distance(1.0).with_scope(Scope::Host);
        assert!(f64_approx_equal(f.evaluate(&simple_complex()), 3.0));
    }

    #[test]
    fn min_distance_on_guest_scope_uses_guest_pairs_only() {
        let f = ThresholdFitness::min_distance(1.0).with_scope(Scope::Guest);
        assert!(f64_approx_equal(f.evaluate(&simple_complex()), 1.5));
    }

    #[test]
    fn min_distance_with_single_site_guest_scope_is_rejected() {
        let cpx = Complex::new(body("Si", &[[0.0; 3]]), body("C", &[[3.0, 0.0, 0.0]]));
        let f = ThresholdFitness::min_distance(1.0).with_scope(Scope::Guest);
        assert_eq!(f.score(&cpx), Err(FitnessError::EmptyScope(Scope::Guest)));
        assert_eq!(f.evaluate(&cpx), REJECTED);
    }

    #[test]
    fn mean_distance_averages_per_guest_site_minimums() {
        let f = ThresholdFitness::mean_distance(1.0);
        let expected = (5f64.sqrt() + 2.5) / 2.0 - 1.0;
        assert!(f64_approx_equal(f.evaluate(&simple_complex()), expected));
    }

    #[test]
    fn sum_inverse_penalizes_close_contacts() {
        // cutoff = 2 * 1.25 = 2.5 keeps only the two sqrt(5) distances.
        let f = ThresholdFitness::sum_inverse_distance(1.25);
        let expected = -1.0 / 5f64.sqrt();
        assert!(f64_approx_equal(f.evaluate(&simple_complex()), expected));
    }

    #[test]
    fn sum_inverse_with_no_close_contacts_is_an_error() {
        let f = ThresholdFitness::sum_inverse_distance(0.5);
        assert_eq!(
            f.score(&simple_complex()),
            Err(FitnessError::EmptyDistanceSet {
                scope: Scope::Cross,
                cutoff: 1.0
            })
        );
        assert_eq!(f.evaluate(&simple_complex()), REJECTED);
    }
}
