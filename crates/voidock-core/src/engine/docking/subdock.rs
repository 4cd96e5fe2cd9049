use super::{Docker, ranking};
use crate::core::models::body::Body;
use crate::engine::config::SubdockConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::Candidate;
use tracing::{info, instrument};

/// Ranked candidates per loading level. `rounds()[0]` holds the poses with one guest.
///
/// Only rounds that produced at least one candidate are recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadingHistory {
    rounds: Vec<Vec<Candidate>>,
}

impl LoadingHistory {
    pub fn from_rounds(rounds: Vec<Vec<Candidate>>) -> Self {
        Self {
            rounds: rounds.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    pub fn rounds(&self) -> &[Vec<Candidate>] {
        &self.rounds
    }

    /// Candidates at `level` (1-based).
    pub fn round(&self, level: usize) -> Option<&[Candidate]> {
        level
            .checked_sub(1)
            .and_then(|i| self.rounds.get(i))
            .map(Vec::as_slice)
    }

    /// Highest loading reached, or zero when nothing was docked.
    pub fn max_loading(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Best candidate of the highest loading level.
    pub fn best(&self) -> Option<&Candidate> {
        self.rounds.last().and_then(|round| round.first())
    }

    /// All candidates, lowest loading first, each round in ranked order.
    pub fn flatten(&self) -> Vec<Candidate> {
        self.rounds.iter().flatten().cloned().collect()
    }

    pub fn into_rounds(self) -> Vec<Vec<Candidate>> {
        self.rounds
    }

    fn push(&mut self, round: Vec<Candidate>) {
        self.rounds.push(round);
    }
}

/// Packs as many guests as possible into one host by docking into the best poses of
/// the previous round.
pub struct Subdocker {
    base: Box<dyn Docker>,
    config: SubdockConfig,
}

impl Subdocker {
    pub fn new(base: Box<dyn Docker>, config: SubdockConfig) -> Self {
        Self { base, config }
    }

    pub fn config(&self) -> &SubdockConfig {
        &self.config
    }

    #[instrument(skip_all, name = "subdock")]
    pub fn dock(
        &mut self,
        attempts: usize,
        reporter: &ProgressReporter,
    ) -> Result<LoadingHistory, EngineError> {
        let mut history = LoadingHistory::default();
        let mut candidates = self.base.dock(attempts)?;
        let mut level = 1;

        loop {
            info!(level, candidates = candidates.len(), "Loading round finished.");
            reporter.report(Progress::LoadingLevel {
                level,
                candidates: candidates.len(),
            });
            if candidates.is_empty() {
                break;
            }

            let seeds: Vec<Body> = candidates
                .iter()
                .take(self.config.max_subdock)
                .map(|c| c.complex.pose())
                .collect();
            history.push(candidates);

            if self.config.max_loading.is_some_and(|max| level >= max) {
                info!(level, "Reached the maximum loading.");
                break;
            }

            reporter.report(Progress::TaskStart {
                total_steps: seeds.len() as u64,
            });
            let mut next_round = Vec::new();
            for host in seeds {
                let mut sub = self.base.spawn(host);
                next_round.extend(sub.dock(attempts)?);
                reporter.report(Progress::TaskIncrement);
            }
            reporter.report(Progress::TaskFinish);
            candidates = ranking::rerank(next_round);
            level += 1;
        }

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{dimer, octahedron};
    use super::super::{PointDocker, strategy_for};
    use super::*;
    use crate::core::fitness::threshold::ThresholdFitness;
    use crate::core::models::complex::Complex;
    use crate::core::models::site::Site;
    use crate::core::samplers::{FixedPointsSampler, RandomSampler};
    use crate::core::utils::geometry::PeriodicCell;
    use crate::engine::config::DockingStrategy;
    use nalgebra::{Matrix3, Point3};
    use std::sync::Arc;

    /// Octahedral Si cage of radius 5 with anchor points at x = ±2.5. Each docked guest
    /// shifts the frame, so the cage fits exactly three short dimers along the x axis.
    fn subdocker(max_loading: Option<usize>) -> Subdocker {
        let sampler = FixedPointsSampler::new(vec![
            Point3::new(2.5, 0.0, 0.0),
            Point3::new(-2.5, 0.0, 0.0),
        ]);
        let docker = PointDocker::new(
            octahedron("Si", [0.0; 3], 5.0),
            dimer(0.8),
            Arc::new(sampler),
            Arc::new(ThresholdFitness::min_distance(1.5)),
            strategy_for(DockingStrategy::Serial),
            Some(21),
        );
        Subdocker::new(
            Box::new(docker),
            SubdockConfig {
                max_subdock: 1,
                max_loading,
            },
        )
    }

    fn counts(history: &LoadingHistory) -> Vec<usize> {
        history.rounds().iter().map(Vec::len).collect()
    }

    #[test]
    fn loading_grows_until_no_pose_fits() {
        let history = subdocker(None).dock(3, &ProgressReporter::new()).unwrap();
        assert_eq!(counts(&history), vec![6, 3, 3]);
        assert_eq!(history.max_loading(), 3);
        let best = history.best().unwrap();
        assert_eq!(best.complex.len(), 6 + 3 * 2);
    }

    #[test]
    fn max_loading_caps_the_number_of_rounds() {
        let history = subdocker(Some(2)).dock(3, &ProgressReporter::new()).unwrap();
        assert_eq!(counts(&history), vec![6, 3]);
    }

    #[test]
    fn reporter_sees_every_round_including_the_empty_one() {
        let levels = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::LoadingLevel { level, candidates } = event {
                levels.lock().unwrap().push((level, candidates));
            }
        }));
        subdocker(None).dock(3, &reporter).unwrap();
        drop(reporter);
        assert_eq!(
            levels.into_inner().unwrap(),
            vec![(1, 6), (2, 3), (3, 3), (4, 0)]
        );
    }

    #[test]
    fn reporter_counts_one_step_per_seed_host() {
        let events = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
            Progress::TaskStart { total_steps } => events.lock().unwrap().push(total_steps),
            Progress::TaskIncrement => events.lock().unwrap().push(0),
            _ => {}
        }));
        subdocker(None).dock(3, &reporter).unwrap();
        drop(reporter);
        // Rounds two to four each dock into the single best pose.
        assert_eq!(events.into_inner().unwrap(), vec![1, 0, 1, 0, 1, 0]);
    }

    /// 64 Si sites on a 2.5 Å grid in a 10 Å cubic cell. Through the cell faces every
    /// point lies within 2.17 Å of a site.
    fn dense_framework() -> Body {
        let grid = [0.0, 2.5, 5.0, 7.5];
        let sites = itertools::iproduct!(grid, grid, grid)
            .map(|(x, y, z)| Site::new("Si", Point3::new(x, y, z)))
            .collect();
        Body::new(sites).with_lattice(Matrix3::identity() * 10.0)
    }

    fn periodic_subdocker(host: Body, threshold: f64, max_loading: usize) -> Subdocker {
        let docker = PointDocker::new(
            host,
            Body::new(vec![Site::new("C", Point3::origin())]),
            Arc::new(RandomSampler { num_samples: 200 }),
            Arc::new(ThresholdFitness::min_distance(threshold)),
            strategy_for(DockingStrategy::Success),
            Some(5),
        );
        Subdocker::new(
            Box::new(docker),
            SubdockConfig {
                max_subdock: 1,
                max_loading: Some(max_loading),
            },
        )
    }

    #[test]
    fn dense_periodic_framework_admits_no_guest() {
        let history = periodic_subdocker(dense_framework(), 2.2, 5)
            .dock(4, &ProgressReporter::new())
            .unwrap();
        assert_eq!(history.max_loading(), 0);
        assert!(history.flatten().is_empty());
    }

    #[test]
    fn loaded_poses_stay_inside_the_cell() {
        let host = Body::new(vec![Site::new("Si", Point3::new(5.0, 5.0, 5.0))])
            .with_lattice(Matrix3::identity() * 10.0);
        let history = periodic_subdocker(host, 1.0, 4)
            .dock(4, &ProgressReporter::new())
            .unwrap();
        assert_eq!(history.max_loading(), 4);
        let cell = PeriodicCell::new(&(Matrix3::identity() * 10.0)).unwrap();
        for candidate in history.flatten() {
            let guest = &candidate.complex.guest().sites()[0];
            for site in candidate.complex.host().sites() {
                let frac = cell.fractional(&site.position);
                assert!(frac.iter().all(|x| (-1e-9..1.0 + 1e-9).contains(x)));
                assert!(site.distance_in(guest, Some(&cell)) >= 1.0);
            }
        }
    }

    #[test]
    fn history_accessors_follow_loading_order() {
        let one = Candidate::new(1.0, Complex::new(Body::default(), Body::default()));
        let two = Candidate::new(2.0, Complex::new(Body::default(), Body::default()));
        let history = LoadingHistory::from_rounds(vec![vec![two.clone(), one.clone()], vec![], vec![one.clone()]]);
        assert_eq!(history.max_loading(), 2);
        assert_eq!(history.round(1).unwrap().len(), 2);
        assert!(history.round(0).is_none());
        assert_eq!(history.best(), Some(&one));
        assert_eq!(history.flatten(), vec![two, one.clone(), one]);
    }

    #[test]
    fn empty_history_has_no_best_candidate() {
        let history = LoadingHistory::default();
        assert!(history.is_empty());
        assert!(history.best().is_none());
        assert!(history.flatten().is_empty());
    }
}
