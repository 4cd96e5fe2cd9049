use super::serial::SerialStrategy;
use super::{PlacementContext, PlacementStrategy, translated_host_positions};
use crate::core::models::complex::Complex;
use nalgebra::Point3;
use rand::rngs::StdRng;
use tracing::debug;

/// Builds candidates one at a time and stops at the first with non-negative fitness.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessStrategy;

impl PlacementStrategy for SuccessStrategy {
    fn name(&self) -> &'static str {
        "success"
    }

    fn dock_at_point(
        &self,
        context: &PlacementContext<'_>,
        point: &Point3<f64>,
        attempts: usize,
        rng: &mut StdRng,
    ) -> Vec<Complex> {
        let host_positions = translated_host_positions(context.host, point);
        for trial in 0..attempts {
            let cpx = SerialStrategy::candidate(context, &host_positions, rng);
            if context.fitness.evaluate(&cpx) >= 0.0 {
                debug!(attempts = trial + 1, "Found a valid pose.");
                return vec![cpx];
            }
        }
        debug!(attempts, "No valid pose within the attempt budget.");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{dimer, octahedron};
    use super::*;
    use crate::core::fitness::{Fitness, FitnessError};
    use crate::core::fitness::threshold::ThresholdFitness;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts evaluations and accepts from the `accept_from`-th call on.
    struct Counting {
        calls: AtomicUsize,
        accept_from: usize,
    }

    impl Fitness<Complex> for Counting {
        fn score(&self, _state: &Complex) -> Result<f64, FitnessError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(if call >= self.accept_from { 1.0 } else { -1.0 })
        }
    }

    fn run(fitness: &dyn Fitness<Complex>, attempts: usize) -> Vec<Complex> {
        let host = octahedron("Si", [0.0; 3], 5.0);
        let guest = dimer(1.2);
        let context = PlacementContext {
            host: &host,
            guest: &guest,
            fitness,
        };
        let mut rng = StdRng::seed_from_u64(8);
        SuccessStrategy.dock_at_point(&context, &Point3::origin(), attempts, &mut rng)
    }

    #[test]
    fn stops_at_the_first_success() {
        let fitness = Counting {
            calls: AtomicUsize::new(0),
            accept_from: 3,
        };
        assert_eq!(run(&fitness, 10).len(), 1);
        assert_eq!(fitness.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn never_exceeds_the_attempt_budget() {
        let fitness = Counting {
            calls: AtomicUsize::new(0),
            accept_from: usize::MAX,
        };
        assert!(run(&fitness, 6).is_empty());
        assert_eq!(fitness.calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn returned_pose_satisfies_the_fitness() {
        let fitness = ThresholdFitness::min_distance(1.5);
        let result = run(&fitness, 10);
        assert_eq!(result.len(), 1);
        assert!(result[0].min_cross_distance().unwrap() > 1.5);
    }
}
